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

//! "Did you mean" helpers for user-facing name lookups.

use suggest::Suggest;

/// The maximum number of names returned by [`closest_names`].
const MAX_SUGGESTIONS: usize = 5;

/// Returns the candidates that look most like `query`, closest first.
///
/// Candidates sharing a prefix with the query are listed first, followed by the
/// edit-distance match, without duplicates.
pub(crate) fn closest_names<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let candidates: Vec<&str> = candidates.into_iter().collect();
    let needle = query.trim().to_ascii_lowercase();
    let mut found: Vec<String> = Vec::new();

    if !needle.is_empty() {
        for candidate in &candidates {
            let lowered = candidate.to_ascii_lowercase();
            if lowered.starts_with(&needle) || needle.starts_with(&lowered) {
                found.push(candidate.to_string());
            }
        }
    }

    if let Some(best) = candidates.suggest(query) {
        let best = best.to_string();
        if !found.contains(&best) {
            found.insert(0, best);
        }
    }

    found.truncate(MAX_SUGGESTIONS);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_candidates_are_suggested() {
        let names = ["updating", "starting", "typing"];
        let found = closest_names("updat", names);
        assert!(found.contains(&"updating".to_string()), "Got {found:?}");
        assert!(!found.contains(&"typing".to_string()));
    }

    #[test]
    fn test_no_candidates_gives_nothing() {
        assert!(closest_names("anything", std::iter::empty()).is_empty());
    }
}
