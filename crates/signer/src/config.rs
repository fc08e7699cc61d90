//! Render configuration

use crate::{Result, SignError};
use pdf_core::Color;
use serde::{Deserialize, Serialize};

/// Layout constants for drawing fields, all lengths in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Font size as a share of the box height.
    /// Default: 0.7.
    pub font_size_ratio: f64,

    /// Upper bound on the font size.
    /// Default: 14.
    pub max_font_size: f64,

    /// Gap between the box's left edge and the text.
    /// Default: 2.
    pub text_inset: f64,

    /// Stroke width of checkbox squares and radio circles.
    /// Default: 1.5.
    pub border_width: f64,

    /// Checkbox square side as a share of the box's shorter side.
    /// Default: 0.8.
    pub checkbox_ratio: f64,

    /// Radio radius as a share of the box's shorter side.
    /// Default: 0.35.
    pub radio_ratio: f64,

    /// Ink color for text and shapes (0-255 per channel).
    /// Default: black.
    pub ink_color: [u8; 3],

    /// Allowed difference between the client's page size and the real one
    /// before a warning is logged.
    /// Default: 1.
    pub page_size_tolerance: f64,

    /// Allowed overhang of a field box past the page edge.
    /// Default: 0.01.
    pub bounds_tolerance: f64,

    /// URL prefix the web layer serves signed files under.
    /// Default: `/uploads/signed`.
    pub url_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size_ratio: 0.7,
            max_font_size: 14.0,
            text_inset: 2.0,
            border_width: 1.5,
            checkbox_ratio: 0.8,
            radio_ratio: 0.35,
            ink_color: [0, 0, 0],
            page_size_tolerance: 1.0,
            bounds_tolerance: 0.01,
            url_prefix: "/uploads/signed".to_string(),
        }
    }
}

impl RenderConfig {
    /// Set the maximum font size.
    pub fn max_font_size(mut self, size: f64) -> Self {
        self.max_font_size = size;
        self
    }

    /// Set the border width of checkboxes and radios.
    pub fn border_width(mut self, width: f64) -> Self {
        self.border_width = width;
        self
    }

    /// Set the ink color.
    pub fn ink_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.ink_color = [r, g, b];
        self
    }

    /// Set the page size tolerance.
    pub fn page_size_tolerance(mut self, tolerance: f64) -> Self {
        self.page_size_tolerance = tolerance;
        self
    }

    /// Set the URL prefix for signed files.
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn ink(&self) -> Color {
        let [r, g, b] = self.ink_color;
        Color::from_rgb(r, g, b)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("fontSizeRatio", self.font_size_ratio),
            ("maxFontSize", self.max_font_size),
            ("borderWidth", self.border_width),
            ("checkboxRatio", self.checkbox_ratio),
            ("radioRatio", self.radio_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SignError::InvalidConfig(format!(
                    "{name} must be a positive number"
                )));
            }
        }

        let non_negative = [
            ("textInset", self.text_inset),
            ("pageSizeTolerance", self.page_size_tolerance),
            ("boundsTolerance", self.bounds_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SignError::InvalidConfig(format!(
                    "{name} must not be negative"
                )));
            }
        }

        if self.checkbox_ratio > 1.0 {
            return Err(SignError::InvalidConfig(
                "checkboxRatio must be at most 1".to_string(),
            ));
        }
        if self.radio_ratio > 0.5 {
            return Err(SignError::InvalidConfig(
                "radioRatio must be at most 0.5".to_string(),
            ));
        }
        Ok(())
    }
}
