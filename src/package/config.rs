//! Packaging metadata: every recognized field with its default, and the JSON layout the
//! font packager expects.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options for the font packager. Loaded from `[package]` in `strokes2font.toml`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Font family name; also the base name of the generated files. Default `ids`.
    pub font_name: String,
    /// Clear the destination before writing. Default true.
    pub empty_dist: bool,
    /// Also emit React components per glyph. Default false.
    pub out_svg_react: bool,
    /// Use each file name as the glyph's unicode name. Default true.
    pub use_name_as_unicode: bool,
    /// Emit a stylesheet alongside the font. Default true.
    pub css: bool,
    /// Scale glyphs to the same height. Default true.
    pub normalize: bool,
    /// Glyph height in font units. Default 1000.
    pub font_height: u32,
    pub website: WebsiteConfig,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            font_name: "ids".to_string(),
            empty_dist: true,
            out_svg_react: false,
            use_name_as_unicode: true,
            css: true,
            normalize: true,
            font_height: 1000,
            website: WebsiteConfig::default(),
        }
    }
}

/// Preview page generated next to the font.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebsiteConfig {
    pub title: String,
    /// Logo image; relative paths resolve against the working directory. Default `svg/git.svg`.
    pub logo: Option<PathBuf>,
    pub description: String,
    pub keywords: String,
    /// Cross-reference links shown in the page header.
    pub links: Vec<Link>,
    /// CSS color for the page background.
    pub background_color: Option<String>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            title: "ids".to_string(),
            logo: Some(PathBuf::from("svg").join("git.svg")),
            description: "Converts SVG fonts to TTF/EOT/WOFF/WOFF2/SVG format.".to_string(),
            keywords: "svgtofont,TTF,EOT,WOFF,WOFF2,SVG".to_string(),
            links: Vec::new(),
            background_color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub title: String,
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackagerOptions<'a> {
    src: &'a Path,
    dist: &'a Path,
    font_name: &'a str,
    empty_dist: bool,
    #[serde(rename = "outSVGReact")]
    out_svg_react: bool,
    use_name_as_unicode: bool,
    css: bool,
    svgicons2svgfont: GlyphOptions,
    website: WebsiteOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GlyphOptions {
    normalize: bool,
    font_height: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebsiteOptions<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<PathBuf>,
    meta: Meta<'a>,
    #[serde(skip_serializing_if = "no_links")]
    links: &'a [Link],
    #[serde(skip_serializing_if = "Option::is_none")]
    background_color: Option<&'a str>,
}

fn no_links(links: &&[Link]) -> bool {
    links.is_empty()
}

#[derive(Serialize)]
struct Meta<'a> {
    description: &'a str,
    keywords: &'a str,
}

impl PackageConfig {
    /// Packager options as JSON for `src` → `dist`, with the logo resolved against `cwd`.
    pub fn to_packager_json(&self, src: &Path, dist: &Path, cwd: &Path) -> serde_json::Result<String> {
        let options = PackagerOptions {
            src,
            dist,
            font_name: &self.font_name,
            empty_dist: self.empty_dist,
            out_svg_react: self.out_svg_react,
            use_name_as_unicode: self.use_name_as_unicode,
            css: self.css,
            svgicons2svgfont: GlyphOptions {
                normalize: self.normalize,
                font_height: self.font_height,
            },
            website: WebsiteOptions {
                title: &self.website.title,
                logo: self.website.logo.as_ref().map(|p| cwd.join(p)),
                meta: Meta {
                    description: &self.website.description,
                    keywords: &self.website.keywords,
                },
                links: &self.website.links,
                background_color: self.website.background_color.as_deref(),
            },
        };
        serde_json::to_string_pretty(&options)
    }
}
