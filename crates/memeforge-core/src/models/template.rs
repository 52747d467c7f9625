//! Template variants and their fixed layout tables
//!
//! Each variant carries its own pixel layout: where the uploaded image is stretched to and where
//! each caption is drawn. The on-disk background asset is resolved from configuration, not from
//! the variant itself.

use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// RGBA color with 8-bit channels
pub type Rgba8 = [u8; 4];

pub const WHITE: Rgba8 = [255, 255, 255, 255];
pub const LIGHT_GRAY: Rgba8 = [0xE0, 0xE0, 0xE0, 255];
pub const MUTED_GRAY: Rgba8 = [0xCC, 0xCC, 0xCC, 255];

/// Rectangle the uploaded image is stretched into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Drop shadow drawn behind a caption
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub color: Rgba8,
    /// Blur radius in pixels, interpreted like a canvas `shadowBlur` (sigma = blur / 2)
    pub blur: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Which caption field a style applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionSlot {
    Title,
    Subtitle,
    Subtitle2,
    Subtitle3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    pub slot: CaptionSlot,
    pub x: i32,
    /// Alphabetic baseline of the text
    pub baseline_y: i32,
    /// Font size in pixels per em
    pub size: f32,
    pub color: Rgba8,
    pub shadow: Option<DropShadow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateLayout {
    pub image_rect: ImageRect,
    pub captions: &'static [CaptionStyle],
}

const CLASSIC_LAYOUT: TemplateLayout = TemplateLayout {
    image_rect: ImageRect {
        x: 1,
        y: 110,
        width: 500,
        height: 315,
    },
    captions: &[
        CaptionStyle {
            slot: CaptionSlot::Title,
            x: 20,
            baseline_y: 460,
            size: 25.0,
            color: WHITE,
            shadow: Some(DropShadow {
                color: [0, 0, 0, 128],
                blur: 4.0,
                offset_x: 2,
                offset_y: 2,
            }),
        },
        CaptionStyle {
            slot: CaptionSlot::Subtitle,
            x: 20,
            baseline_y: 485,
            size: 18.0,
            color: LIGHT_GRAY,
            shadow: None,
        },
    ],
};

const DETAILED_LAYOUT: TemplateLayout = TemplateLayout {
    image_rect: ImageRect {
        x: 1,
        y: 120,
        width: 498,
        height: 300,
    },
    captions: &[
        CaptionStyle {
            slot: CaptionSlot::Title,
            x: 20,
            baseline_y: 460,
            size: 28.0,
            color: WHITE,
            shadow: Some(DropShadow {
                color: [0, 0, 0, 179],
                blur: 5.0,
                offset_x: 2,
                offset_y: 2,
            }),
        },
        CaptionStyle {
            slot: CaptionSlot::Subtitle,
            x: 20,
            baseline_y: 482,
            size: 18.0,
            color: WHITE,
            shadow: None,
        },
        CaptionStyle {
            slot: CaptionSlot::Subtitle2,
            x: 343,
            baseline_y: 478,
            size: 17.0,
            color: MUTED_GRAY,
            shadow: None,
        },
        CaptionStyle {
            slot: CaptionSlot::Subtitle3,
            x: 435,
            baseline_y: 478,
            size: 17.0,
            color: MUTED_GRAY,
            shadow: None,
        },
    ],
};

/// Background template selectable by the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Title and subtitle under a wide image
    Classic,
    /// Title, subtitle and two small metadata captions
    Detailed,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::Classic, Template::Detailed];

    pub fn slug(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Detailed => "detailed",
        }
    }

    /// Value submitted by the landing page form for this template
    pub fn form_value(&self) -> &'static str {
        match self {
            Template::Classic => "phub.png",
            Template::Detailed => "xnxx.png",
        }
    }

    pub fn layout(&self) -> &'static TemplateLayout {
        match self {
            Template::Classic => &CLASSIC_LAYOUT,
            Template::Detailed => &DETAILED_LAYOUT,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Template {
    type Err = AppError;

    /// Accepts the form value or the slug. Anything else is rejected; there is no default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.form_value() == s || t.slug() == s)
            .ok_or_else(|| AppError::InvalidTemplate(s.to_string()))
    }
}
