// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dot-segmented namespace matching.
//!
//! A registration on `input.mouse` hears every event below it
//! (`input.mouse.down.left`, `input.mouse.motion`, …), while a registration on
//! `input.mouse.down.left` does not hear a bare `input.mouse` event. Matching is
//! done on whole segments: `input.mouse` does not match `input.mousewheel`.

/// Normalizes a registration namespace: surrounding whitespace and a trailing
/// `.*` wildcard are removed, so `x.y.*` registers exactly as `x.y`.
pub fn normalize(namespace: &str) -> String {
    let trimmed = namespace.trim();
    trimmed.strip_suffix(".*").unwrap_or(trimmed).to_string()
}

/// Returns `true` if a registration on `registered` hears an event named `event`.
pub fn matches(registered: &str, event: &str) -> bool {
    if registered == event {
        return true;
    }
    if registered.is_empty() {
        return false;
    }
    event
        .strip_prefix(registered)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Returns `true` if `namespace` is `prefix` or more specific than it.
///
/// This is the selection rule of bulk removal: clearing `input.mouse` removes
/// `input.mouse` and `input.mouse.down`, but not `input`.
pub fn is_at_least_as_specific(namespace: &str, prefix: &str) -> bool {
    matches(prefix, namespace)
}

/// Iterates over `event` and each of its ancestors, most specific first.
///
/// `input.mouse.down` yields `input.mouse.down`, `input.mouse`, `input`.
pub fn ancestors(event: &str) -> impl Iterator<Item = &str> {
    let mut current = Some(event);
    std::iter::from_fn(move || {
        let here = current?;
        current = here.rsplit_once('.').map(|(parent, _)| parent);
        Some(here)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_registration_hears_specific_event() {
        assert!(matches("input.mouse", "input.mouse.down.left"));
        assert!(matches("input.mouse.down.left", "input.mouse.down.left"));
    }

    #[test]
    fn test_specific_registration_ignores_general_event() {
        assert!(!matches("input.mouse.down.left", "input.mouse"));
    }

    #[test]
    fn test_matching_respects_segment_boundaries() {
        assert!(!matches("input.mouse", "input.mousewheel"));
        assert!(!matches("", "input"));
    }

    #[test]
    fn test_wildcard_suffix_is_stripped() {
        assert_eq!(normalize("x.y.*"), "x.y");
        assert_eq!(normalize(" x.y "), "x.y");
    }

    #[test]
    fn test_ancestors_walk_up() {
        let all: Vec<&str> = ancestors("a.b.c").collect();
        assert_eq!(all, vec!["a.b.c", "a.b", "a"]);
    }
}
