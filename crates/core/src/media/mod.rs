//! Media CDN URL transformation.
//!
//! Images hosted on the CDN are delivered through on-the-fly transformations
//! encoded in the URL path: the segment after `/upload/` carries width, height,
//! crop mode and so on. Rewriting is pure string work. URLs that do not point
//! at the CDN pass through untouched, so locally stored images keep working.

mod transform;

pub use transform::{MediaUrlBuilder, Quality, TransformOptions};
