//! Built-in tools (§4.J): the ones a [`crate::forge::Forge`] ships with,
//! registered the same way a user's own [`crate::tool::Tool`] would be.
//! There is no dynamic plugin ABI — every tool, built-in or user-authored,
//! is just a `Box<dyn Tool>` pushed onto the same [`crate::registry::Registry`].

pub mod atlas;
pub mod compress;
pub mod copy;
pub mod svg;
pub mod symlink;

pub use atlas::AtlasTool;
pub use compress::CompressTool;
pub use copy::CopyTool;
pub use svg::SvgTool;
pub use symlink::SymlinkTool;
