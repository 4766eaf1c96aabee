//! Transformation segment builder.

/// Output quality requested from the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Let the CDN pick.
    #[default]
    Auto,
    /// Fixed quality, 1-100.
    Fixed(u8),
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(q) => write!(f, "{q}"),
        }
    }
}

/// Options for a single transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Crop mode (`fill`, `thumb`, `fit`, ...).
    pub crop: String,
    /// Focus area (`auto`, `face`, ...).
    pub gravity: String,
    /// Output quality.
    pub quality: Quality,
    /// Output format (`auto`, `webp`, ...).
    pub format: String,
    /// Extra effect, e.g. `contrast:10`.
    pub effect: Option<String>,
    /// Blur strength.
    pub blur: Option<u32>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            crop: "fill".to_string(),
            gravity: "auto".to_string(),
            quality: Quality::Auto,
            format: "auto".to_string(),
            effect: None,
            blur: None,
        }
    }
}

impl TransformOptions {
    /// Set the crop mode.
    #[must_use]
    pub fn crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = crop.into();
        self
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: impl Into<String>) -> Self {
        self.gravity = gravity.into();
        self
    }

    /// Set the quality.
    #[must_use]
    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Add an effect.
    #[must_use]
    pub fn effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Add a blur.
    #[must_use]
    pub fn blur(mut self, strength: u32) -> Self {
        self.blur = Some(strength);
        self
    }

    fn segment(&self, width: u32, height: u32) -> String {
        let mut segment = format!(
            "w_{width},h_{height},c_{},g_{},q_{},f_{}",
            self.crop, self.gravity, self.quality, self.format
        );
        if let Some(effect) = &self.effect {
            segment.push_str(&format!(",e_{effect}"));
        }
        if let Some(blur) = self.blur {
            segment.push_str(&format!(",e_blur:{blur}"));
        }
        segment
    }
}

/// Builds optimized CDN URLs for catalog images.
#[derive(Debug, Clone)]
pub struct MediaUrlBuilder {
    cdn_host: String,
}

impl Default for MediaUrlBuilder {
    fn default() -> Self {
        Self::new("cloudinary.com")
    }
}

impl MediaUrlBuilder {
    /// Path marker after which the transformation segment is inserted.
    const UPLOAD_MARKER: &'static str = "/upload/";

    /// Default card size.
    pub const CARD_SIZE: (u32, u32) = (400, 300);
    /// Default thumbnail size.
    pub const THUMBNAIL_SIZE: (u32, u32) = (100, 100);
    /// Default hero banner size.
    pub const HERO_SIZE: (u32, u32) = (1200, 600);
    /// Default placeholder width.
    pub const PLACEHOLDER_WIDTH: u32 = 20;

    /// Create a builder matching URLs that contain `cdn_host`.
    #[must_use]
    pub fn new(cdn_host: impl Into<String>) -> Self {
        Self {
            cdn_host: cdn_host.into(),
        }
    }

    /// Whether the URL can be transformed by the CDN.
    #[must_use]
    pub fn is_cdn_url(&self, url: &str) -> bool {
        !url.is_empty() && url.contains(&self.cdn_host) && url.contains(Self::UPLOAD_MARKER)
    }

    /// Rewrite `url` to deliver a `width`×`height` rendition.
    ///
    /// Returns the input unchanged when it is not a CDN URL.
    #[must_use]
    pub fn optimize(&self, url: &str, width: u32, height: u32, options: &TransformOptions) -> String {
        if !self.is_cdn_url(url) {
            return url.to_string();
        }
        let replacement = format!(
            "{}{}/",
            Self::UPLOAD_MARKER,
            options.segment(width, height)
        );
        url.replacen(Self::UPLOAD_MARKER, &replacement, 1)
    }

    /// Vehicle card rendition with default options.
    #[must_use]
    pub fn card(&self, url: &str) -> String {
        let (width, height) = Self::CARD_SIZE;
        self.optimize(url, width, height, &TransformOptions::default())
    }

    /// Face-centred thumbnail.
    #[must_use]
    pub fn thumbnail(&self, url: &str, width: u32, height: u32) -> String {
        let options = TransformOptions::default().crop("thumb").gravity("face");
        self.optimize(url, width, height, &options)
    }

    /// Wide banner with a slight contrast boost.
    #[must_use]
    pub fn hero_banner(&self, url: &str, width: u32, height: u32) -> String {
        let options = TransformOptions::default().effect("contrast:10");
        self.optimize(url, width, height, &options)
    }

    /// Tiny blurred rendition for progressive loading; height is 3/4 of width.
    #[must_use]
    pub fn low_quality(&self, url: &str, width: u32) -> String {
        let height = (width.saturating_mul(3) + 2) / 4;
        let options = TransformOptions::default()
            .quality(Quality::Fixed(30))
            .blur(1000);
        self.optimize(url, width, height, &options)
    }
}
