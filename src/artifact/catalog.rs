//! Static table of every generated-file kind.
//!
//! The `required` flag here is the one policy every code path consults: a
//! required artifact that cannot be produced aborts the render, an optional
//! one is logged and left out of the control file.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    MacroLink,
    Settings,
    Extension,
    DefaultStyle,
    DefaultStyleExtension,
    GroupTexExtension,
    GroupStyleExtension,
    ComponentTexExtension,
    ComponentStyleExtension,
    HyphenationExceptions,
    Lccode,
    Control,
    Pdf,
    Background,
}

/// How an artifact comes into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Written from configuration by a generator.
    Generated,
    /// Created once from a template or as an empty stub, then left to the user.
    Placeholder,
    /// Copied from the macro package.
    Copied,
    /// Produced by the external renderer.
    Rendered,
    /// Drawn as SVG and converted by an external tool.
    Converted,
}

#[derive(Debug, Clone, Copy)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub id: &'static str,
    pub generation: Generation,
    pub required: bool,
    pub description: &'static str,
}

pub const CATALOG: &[ArtifactSpec] = &[
    ArtifactSpec {
        kind: ArtifactKind::MacroLink,
        id: "macLink",
        generation: Generation::Generated,
        required: true,
        description: "Links the project to its macro package",
    },
    ArtifactSpec {
        kind: ArtifactKind::Settings,
        id: "settings",
        generation: Generation::Generated,
        required: true,
        description: "Layout and font settings for the renderer",
    },
    ArtifactSpec {
        kind: ArtifactKind::Extension,
        id: "extension",
        generation: Generation::Placeholder,
        required: true,
        description: "Project macro extensions",
    },
    ArtifactSpec {
        kind: ArtifactKind::DefaultStyle,
        id: "defaultStyle",
        generation: Generation::Copied,
        required: true,
        description: "Default stylesheet of the macro package",
    },
    ArtifactSpec {
        kind: ArtifactKind::DefaultStyleExtension,
        id: "defaultStyleExtension",
        generation: Generation::Placeholder,
        required: false,
        description: "Project style extensions",
    },
    ArtifactSpec {
        kind: ArtifactKind::GroupTexExtension,
        id: "groupTexExtension",
        generation: Generation::Placeholder,
        required: false,
        description: "Group macro overrides",
    },
    ArtifactSpec {
        kind: ArtifactKind::GroupStyleExtension,
        id: "groupStyleExtension",
        generation: Generation::Placeholder,
        required: false,
        description: "Group style overrides",
    },
    ArtifactSpec {
        kind: ArtifactKind::ComponentTexExtension,
        id: "componentTexExtension",
        generation: Generation::Placeholder,
        required: false,
        description: "Per-component macro overrides (on/off pair)",
    },
    ArtifactSpec {
        kind: ArtifactKind::ComponentStyleExtension,
        id: "componentStyleExtension",
        generation: Generation::Placeholder,
        required: false,
        description: "Per-component style overrides (on/off pair)",
    },
    ArtifactSpec {
        kind: ArtifactKind::HyphenationExceptions,
        id: "hyphenation",
        generation: Generation::Generated,
        required: false,
        description: "Hyphenation exceptions from the processed word list",
    },
    ArtifactSpec {
        kind: ArtifactKind::Lccode,
        id: "lccode",
        generation: Generation::Generated,
        required: false,
        description: "Character codes for non-word-forming characters",
    },
    ArtifactSpec {
        kind: ArtifactKind::Control,
        id: "control",
        generation: Generation::Generated,
        required: true,
        description: "Group control file handed to the renderer",
    },
    ArtifactSpec {
        kind: ArtifactKind::Pdf,
        id: "pdf",
        generation: Generation::Rendered,
        required: true,
        description: "Rendered group output",
    },
    ArtifactSpec {
        kind: ArtifactKind::Background,
        id: "background",
        generation: Generation::Converted,
        required: false,
        description: "Background composite (lines, crop marks, page box)",
    },
];

impl ArtifactKind {
    pub const ALL: [Self; 14] = [
        Self::MacroLink,
        Self::Settings,
        Self::Extension,
        Self::DefaultStyle,
        Self::DefaultStyleExtension,
        Self::GroupTexExtension,
        Self::GroupStyleExtension,
        Self::ComponentTexExtension,
        Self::ComponentStyleExtension,
        Self::HyphenationExceptions,
        Self::Lccode,
        Self::Control,
        Self::Pdf,
        Self::Background,
    ];

    #[must_use]
    pub fn spec(self) -> &'static ArtifactSpec {
        // CATALOG is declared in enum order
        &CATALOG[self as usize]
    }

    #[must_use]
    pub fn is_required(self) -> bool {
        self.spec().required
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        self.spec().id
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
