//! Lumen Core - framebuffer and image output.
//!
//! This crate provides:
//!
//! - **Framebuffer**: a packed RGB24 image written by the renderer, with
//!   disjoint row regions that worker threads can fill concurrently
//! - **Encoders**: bit-exact PPM (P3) and BMP writers, plus PNG/JPEG through
//!   the `image` crate when the `png`/`jpeg` features are enabled
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Framebuffer, OutputFormat};
//!
//! let mut fb = Framebuffer::new(4, 2);
//! fb.write_pixel(0, 0, Color::ONE);
//! fb.write_to(&mut std::io::stdout().lock(), OutputFormat::Ppm)?;
//! ```

pub mod encode;
pub mod format;
pub mod framebuffer;

// Re-export commonly used types
pub use encode::{write_to, BmpHeader, BmpOrder, EncodeError, EncodeResult};
pub use format::{OutputFormat, UnknownFormat};
pub use framebuffer::{color_to_rgb, linear_to_gamma, Framebuffer, FramebufferRegion};
