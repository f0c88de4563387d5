//! Export Adapters
//!
//! Implementations of the DocumentRenderer port.
//!
//! ## Available Adapters
//!
//! - **ChromePdfRenderer** - Headless Chromium print-to-PDF (preferred PDF tier)
//! - **PandocRenderer** - Pandoc conversion to PDF and DOCX
//!
//! Both run their backend under a hard timeout and write their input to a
//! scoped temporary file inside the document directory.

mod bounded_command;
mod chrome_renderer;
mod pandoc_renderer;
mod print_styles;
mod temp_html;

pub use bounded_command::{BoundedCommand, CommandError, CommandOutput};
pub use chrome_renderer::ChromePdfRenderer;
pub use pandoc_renderer::{PandocRenderer, DEFAULT_PDF_ENGINE};
pub use print_styles::{inject_print_styles, PRINT_STYLES};
