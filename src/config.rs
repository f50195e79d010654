use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::fonts::BuiltinFont;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Page and font settings applied to every PDF of a run.
///
/// The right margin mirrors the left one and the top margin mirrors the
/// bottom one.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfSettings {
    pub page_width_in: f32,
    pub page_height_in: f32,
    pub margin_left_in: f32,
    pub margin_bottom_in: f32,
    pub font_size_pt: f32,
    pub font: BuiltinFont,
}

impl Default for PdfSettings {
    fn default() -> Self {
        // US Letter with one inch margins.
        Self {
            page_width_in: 8.5,
            page_height_in: 11.0,
            margin_left_in: 1.0,
            margin_bottom_in: 1.0,
            font_size_pt: 12.0,
            font: BuiltinFont::Helvetica,
        }
    }
}

impl PdfSettings {
    pub fn page_width_pt(&self) -> f32 {
        self.page_width_in * POINTS_PER_INCH
    }

    pub fn page_height_pt(&self) -> f32 {
        self.page_height_in * POINTS_PER_INCH
    }

    pub fn margin_left_pt(&self) -> f32 {
        self.margin_left_in * POINTS_PER_INCH
    }

    pub fn margin_bottom_pt(&self) -> f32 {
        self.margin_bottom_in * POINTS_PER_INCH
    }

    /// Distance between consecutive baselines.
    pub fn leading_pt(&self) -> f32 {
        self.font_size_pt * 1.2
    }

    /// Rejects settings that leave no room to print a line.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("page width", self.page_width_in),
            ("page height", self.page_height_in),
            ("font size", self.font_size_pt),
        ];
        for (name, value) in values {
            if !value.is_finite() || value <= 0.0 {
                bail!("The {} must be a positive number, got {}", name, value);
            }
        }
        for (name, value) in [
            ("left margin", self.margin_left_in),
            ("bottom margin", self.margin_bottom_in),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("The {} must be zero or a positive number, got {}", name, value);
            }
        }

        if self.margin_left_in * 2.0 >= self.page_width_in {
            bail!(
                "Left and right margins ({} in each) leave no room on a {} in wide page",
                self.margin_left_in,
                self.page_width_in
            );
        }
        let printable_height = self.page_height_pt() - 2.0 * self.margin_bottom_pt();
        if printable_height < self.leading_pt() {
            bail!(
                "Top and bottom margins ({} in each) leave no room for a {} pt line on a {} in tall page",
                self.margin_bottom_in,
                self.font_size_pt,
                self.page_height_in
            );
        }
        Ok(())
    }
}

/// Metadata applied to every EPUB of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpubOptions {
    /// Series name, used in titles and file names.
    pub series: String,
    pub author: String,
    pub cover: Option<PathBuf>,
}

impl Default for EpubOptions {
    fn default() -> Self {
        Self {
            series: "A Practical Guide To Evil".to_string(),
            author: "ErraticErrata".to_string(),
            cover: None,
        }
    }
}

impl EpubOptions {
    pub fn book_title(&self, number: usize) -> String {
        format!("{} - Book {}", self.series, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = PdfSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.page_width_pt(), 612.0);
        assert_eq!(settings.page_height_pt(), 792.0);
    }

    #[test]
    fn rejects_unusable_settings() {
        let too_wide = PdfSettings {
            margin_left_in: 4.25,
            ..PdfSettings::default()
        };
        assert!(too_wide.validate().is_err());

        let negative = PdfSettings {
            font_size_pt: -3.0,
            ..PdfSettings::default()
        };
        assert!(negative.validate().unwrap_err().to_string().contains("font size"));

        let too_tall = PdfSettings {
            margin_bottom_in: 5.45,
            ..PdfSettings::default()
        };
        assert!(too_tall.validate().is_err());
    }

    #[test]
    fn book_titles_carry_series_and_number() {
        assert_eq!(
            EpubOptions::default().book_title(3),
            "A Practical Guide To Evil - Book 3"
        );
    }
}
