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

//! Named events, handler registration and priority-ordered dispatch.

mod binder;
mod bus;
mod handler;
pub mod names;
pub mod namespace;
mod payload;
mod subscribe;

pub use self::binder::{bind, positional_parameters, ArgSpec};
pub use self::bus::{Binding, DispatchOutcome, EventBus, RegistrationId};
pub use self::handler::{ClickEvent, Handler, IntoResponse, KeyEvent, MotionEvent, Response};
pub use self::payload::{Event, Params};
pub use self::subscribe::Subscribe;

pub(crate) use self::bus::{BusOp, HandlerSlot, IdSource, SharedHandler};
pub(crate) use self::handler::{ClickAdapter, EnterAdapter, KeyAdapter, MotionAdapter, RawAdapter, StartAdapter, UpdateAdapter, ArgsAdapter, ConditionAdapter};
