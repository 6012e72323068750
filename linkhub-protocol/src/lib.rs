pub mod hub;
pub mod link;
pub mod visit;
pub mod visitor;

pub mod prelude {
    pub use crate::hub::{is_valid_slug, Hub};
    pub use crate::link::Link;
    pub use crate::visit::{Click, Visit};
    pub use crate::visitor::{DeviceClass, VisitorContext};
}
