pub mod mapped;
pub use mapped::{Mapped, WindowId};
