use crate::profile::BrandProfile;
use crate::types::{Color, Rgb};

/// The fixed set of preview mockups, in capture (and page) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockupKind {
    BusinessCard,
    Letterhead,
    Envelope,
    SocialAvatar,
    Slide,
}

impl MockupKind {
    pub const ALL: [MockupKind; 5] = [
        MockupKind::BusinessCard,
        MockupKind::Letterhead,
        MockupKind::Envelope,
        MockupKind::SocialAvatar,
        MockupKind::Slide,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MockupKind::BusinessCard => "business-card",
            MockupKind::Letterhead => "letterhead",
            MockupKind::Envelope => "envelope",
            MockupKind::SocialAvatar => "social-avatar",
            MockupKind::Slide => "slide",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MockupKind::BusinessCard => "Business Card",
            MockupKind::Letterhead => "Letterhead",
            MockupKind::Envelope => "Envelope",
            MockupKind::SocialAvatar => "Social Avatar",
            MockupKind::Slide => "Presentation Slide",
        }
    }

    /// Staging raster size in pixels. Several times the on-screen preview
    /// size, so text and edges stay crisp at print resolution no matter
    /// what viewport the interactive preview used.
    pub(crate) fn stage_size(self) -> (u32, u32) {
        match self {
            MockupKind::BusinessCard => (1050, 600),
            MockupKind::Letterhead => (1275, 1650),
            MockupKind::Envelope => (1200, 660),
            MockupKind::SocialAvatar => (800, 800),
            MockupKind::Slide => (1600, 900),
        }
    }

    pub(crate) fn template(self, profile: &BrandProfile) -> ViewTree {
        match self {
            MockupKind::BusinessCard => business_card(profile),
            MockupKind::Letterhead => letterhead(profile),
            MockupKind::Envelope => envelope(profile),
            MockupKind::SocialAvatar => social_avatar(profile),
            MockupKind::Slide => slide(profile),
        }
    }
}

/// Which brand font a text node asks for. `Secondary` falls back to the
/// primary family when the profile has no secondary font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontSlot {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextAnchor {
    Start,
    Middle,
}

/// Immediate-mode drawing nodes, in paint order. Coordinates are staging
/// pixels with the origin at the top-left.
#[derive(Debug, Clone)]
pub(crate) enum ViewNode {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Color,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        color: Color,
    },
    Text {
        x: f32,
        /// Baseline, from the top of the stage.
        y: f32,
        size: f32,
        font: FontSlot,
        color: Color,
        anchor: TextAnchor,
        content: String,
    },
    /// Brand logo fitted into the given box; skipped when no logo is set.
    Logo {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ViewTree {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub nodes: Vec<ViewNode>,
}

fn brand_color(hex: &str) -> Color {
    Rgb::from_hex(hex).map(Rgb::to_color).unwrap_or(Color::BLACK)
}

const INK: Color = Color {
    r: 0.16,
    g: 0.17,
    b: 0.20,
};

const PAPER_GRAY: Color = Color {
    r: 0.82,
    g: 0.83,
    b: 0.85,
};

fn business_card(profile: &BrandProfile) -> ViewTree {
    let (w, h) = MockupKind::BusinessCard.stage_size();
    let primary = brand_color(&profile.colors.primary.hex);
    let secondary = brand_color(&profile.colors.secondary.hex);
    let accent = profile
        .colors
        .accent
        .as_ref()
        .map(|c| brand_color(&c.hex))
        .unwrap_or(secondary);

    let mut nodes = vec![
        ViewNode::Rect {
            x: 0.0,
            y: 0.0,
            w: w as f32,
            h: h as f32,
            radius: 36.0,
            color: primary,
        },
        ViewNode::Rect {
            x: 0.0,
            y: h as f32 - 90.0,
            w: w as f32,
            h: 90.0,
            radius: 0.0,
            color: secondary,
        },
        ViewNode::Circle {
            cx: w as f32 - 140.0,
            cy: 140.0,
            r: 60.0,
            color: accent,
        },
        ViewNode::Text {
            x: 80.0,
            y: 300.0,
            size: 72.0,
            font: FontSlot::Primary,
            color: Color::WHITE,
            anchor: TextAnchor::Start,
            content: profile.name.clone(),
        },
        ViewNode::Text {
            x: 80.0,
            y: 380.0,
            size: 32.0,
            font: FontSlot::Secondary,
            color: Color::WHITE,
            anchor: TextAnchor::Start,
            content: profile.typography.primary.usage.clone(),
        },
    ];
    if profile.logo.is_set() {
        nodes.push(ViewNode::Logo {
            x: 80.0,
            y: 80.0,
            w: 180.0,
            h: 120.0,
        });
    }
    ViewTree {
        width: w,
        height: h,
        background: Color::WHITE,
        nodes,
    }
}

fn letterhead(profile: &BrandProfile) -> ViewTree {
    let (w, h) = MockupKind::Letterhead.stage_size();
    let primary = brand_color(&profile.colors.primary.hex);
    let secondary = brand_color(&profile.colors.secondary.hex);

    let mut nodes = vec![
        ViewNode::Rect {
            x: 0.0,
            y: 0.0,
            w: w as f32,
            h: 180.0,
            radius: 0.0,
            color: primary,
        },
        ViewNode::Text {
            x: 100.0,
            y: 120.0,
            size: 56.0,
            font: FontSlot::Primary,
            color: Color::WHITE,
            anchor: TextAnchor::Start,
            content: profile.name.clone(),
        },
        ViewNode::Rect {
            x: 100.0,
            y: 260.0,
            w: 420.0,
            h: 8.0,
            radius: 4.0,
            color: secondary,
        },
    ];
    // Body copy placeholder bars, like the interactive preview shows.
    for line in 0..9 {
        let width = if line % 4 == 3 { 640.0 } else { 1000.0 };
        nodes.push(ViewNode::Rect {
            x: 100.0,
            y: 360.0 + line as f32 * 80.0,
            w: width,
            h: 22.0,
            radius: 11.0,
            color: PAPER_GRAY,
        });
    }
    nodes.push(ViewNode::Rect {
        x: 0.0,
        y: h as f32 - 90.0,
        w: w as f32,
        h: 90.0,
        radius: 0.0,
        color: secondary,
    });
    if profile.logo.is_set() {
        nodes.push(ViewNode::Logo {
            x: w as f32 - 320.0,
            y: 30.0,
            w: 220.0,
            h: 120.0,
        });
    }
    ViewTree {
        width: w,
        height: h,
        background: Color::WHITE,
        nodes,
    }
}

fn envelope(profile: &BrandProfile) -> ViewTree {
    let (w, h) = MockupKind::Envelope.stage_size();
    let primary = brand_color(&profile.colors.primary.hex);
    let accent = profile
        .colors
        .accent
        .as_ref()
        .map(|c| brand_color(&c.hex))
        .unwrap_or(primary);

    let mut nodes = vec![
        ViewNode::Rect {
            x: 0.0,
            y: 0.0,
            w: w as f32,
            h: h as f32,
            radius: 18.0,
            color: Color::WHITE,
        },
        ViewNode::Rect {
            x: 0.0,
            y: 0.0,
            w: 24.0,
            h: h as f32,
            radius: 0.0,
            color: primary,
        },
        // Return address block.
        ViewNode::Text {
            x: 70.0,
            y: 90.0,
            size: 36.0,
            font: FontSlot::Primary,
            color: INK,
            anchor: TextAnchor::Start,
            content: profile.name.clone(),
        },
        ViewNode::Rect {
            x: 70.0,
            y: 120.0,
            w: 260.0,
            h: 14.0,
            radius: 7.0,
            color: PAPER_GRAY,
        },
        ViewNode::Rect {
            x: 70.0,
            y: 150.0,
            w: 200.0,
            h: 14.0,
            radius: 7.0,
            color: PAPER_GRAY,
        },
        // Stamp corner.
        ViewNode::Rect {
            x: w as f32 - 160.0,
            y: 50.0,
            w: 100.0,
            h: 120.0,
            radius: 8.0,
            color: accent,
        },
    ];
    // Addressee lines, centered-ish.
    for line in 0..3 {
        nodes.push(ViewNode::Rect {
            x: 430.0,
            y: 330.0 + line as f32 * 56.0,
            w: 420.0 - line as f32 * 60.0,
            h: 18.0,
            radius: 9.0,
            color: PAPER_GRAY,
        });
    }
    if profile.logo.is_set() {
        nodes.push(ViewNode::Logo {
            x: 70.0,
            y: h as f32 - 200.0,
            w: 150.0,
            h: 110.0,
        });
    }
    ViewTree {
        width: w,
        height: h,
        background: PAPER_GRAY,
        nodes,
    }
}

fn social_avatar(profile: &BrandProfile) -> ViewTree {
    let (w, h) = MockupKind::SocialAvatar.stage_size();
    let primary = brand_color(&profile.colors.primary.hex);
    let secondary = brand_color(&profile.colors.secondary.hex);
    let initial = profile
        .name
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());

    let mut nodes = vec![
        ViewNode::Circle {
            cx: 400.0,
            cy: 400.0,
            r: 360.0,
            color: secondary,
        },
        ViewNode::Circle {
            cx: 400.0,
            cy: 400.0,
            r: 330.0,
            color: primary,
        },
    ];
    if profile.logo.is_set() {
        nodes.push(ViewNode::Logo {
            x: 230.0,
            y: 230.0,
            w: 340.0,
            h: 340.0,
        });
    } else {
        nodes.push(ViewNode::Text {
            x: 400.0,
            y: 510.0,
            size: 320.0,
            font: FontSlot::Primary,
            color: Color::WHITE,
            anchor: TextAnchor::Middle,
            content: initial,
        });
    }
    ViewTree {
        width: w,
        height: h,
        background: Color::WHITE,
        nodes,
    }
}

fn slide(profile: &BrandProfile) -> ViewTree {
    let (w, h) = MockupKind::Slide.stage_size();
    let primary = brand_color(&profile.colors.primary.hex);
    let secondary = brand_color(&profile.colors.secondary.hex);

    let mut nodes = vec![
        ViewNode::Rect {
            x: 0.0,
            y: 0.0,
            w: w as f32,
            h: h as f32,
            radius: 0.0,
            color: secondary,
        },
        ViewNode::Text {
            x: 110.0,
            y: 200.0,
            size: 80.0,
            font: FontSlot::Primary,
            color: Color::WHITE,
            anchor: TextAnchor::Start,
            content: profile.name.clone(),
        },
        ViewNode::Rect {
            x: 110.0,
            y: 250.0,
            w: 300.0,
            h: 10.0,
            radius: 5.0,
            color: primary,
        },
    ];
    // Three content cards.
    for card in 0..3 {
        let x = 110.0 + card as f32 * 470.0;
        nodes.push(ViewNode::Rect {
            x,
            y: 360.0,
            w: 430.0,
            h: 420.0,
            radius: 24.0,
            color: Color::WHITE,
        });
        nodes.push(ViewNode::Rect {
            x: x + 40.0,
            y: 420.0,
            w: 120.0,
            h: 120.0,
            radius: 16.0,
            color: primary,
        });
        for line in 0..3 {
            nodes.push(ViewNode::Rect {
                x: x + 40.0,
                y: 600.0 + line as f32 * 50.0,
                w: 350.0 - line as f32 * 70.0,
                h: 16.0,
                radius: 8.0,
                color: PAPER_GRAY,
            });
        }
    }
    if profile.logo.is_set() {
        nodes.push(ViewNode::Logo {
            x: w as f32 - 260.0,
            y: 60.0,
            w: 180.0,
            h: 110.0,
        });
    }
    ViewTree {
        width: w,
        height: h,
        background: secondary,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{BrandColor, BrandColors, FontChoice, Logo, Typography};

    fn profile(with_logo: bool) -> BrandProfile {
        let mut logo = Logo::none();
        if with_logo {
            logo.set_svg("<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        }
        BrandProfile {
            name: "Acme".to_string(),
            colors: BrandColors {
                primary: BrandColor::new("#FF5733", "Sunset Orange"),
                secondary: BrandColor::new("#2C3E50", "Midnight Blue"),
                accent: None,
            },
            typography: Typography {
                primary: FontChoice::new("Montserrat", "Headings"),
                secondary: None,
            },
            logo,
        }
    }

    #[test]
    fn capture_order_is_fixed() {
        let ids: Vec<_> = MockupKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(
            ids,
            [
                "business-card",
                "letterhead",
                "envelope",
                "social-avatar",
                "slide"
            ]
        );
    }

    #[test]
    fn templates_match_their_stage_size() {
        let p = profile(false);
        for kind in MockupKind::ALL {
            let tree = kind.template(&p);
            let (w, h) = kind.stage_size();
            assert_eq!((tree.width, tree.height), (w, h), "{}", kind.id());
            assert!(!tree.nodes.is_empty(), "{} has no nodes", kind.id());
        }
    }

    #[test]
    fn logo_nodes_follow_profile() {
        let without = profile(false);
        let with = profile(true);
        for kind in MockupKind::ALL {
            let has_logo_node = |p: &BrandProfile| {
                kind.template(p)
                    .nodes
                    .iter()
                    .any(|n| matches!(n, ViewNode::Logo { .. }))
            };
            assert!(!has_logo_node(&without), "{} without logo", kind.id());
            assert!(has_logo_node(&with), "{} with logo", kind.id());
        }
    }
}
