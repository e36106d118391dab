use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use blog_harvest_core::{sanitize_filename, BlogPost};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::heuristics::non_empty_attr;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{FetchError, Fetcher};

const DEFAULT_EXTENSION: &str = "jpg";
const DEFAULT_STEM: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("invalid image url {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("write failed: {0}")]
    Persist(#[from] PersistError),
}

/// Absolute URLs of every `<img>` in `html`, in document order.
///
/// `src` is preferred, `data-src` (lazy loading) is the fallback. References
/// that cannot be resolved against `base_url` are skipped.
pub fn extract_images(html: &str, base_url: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let base = Url::parse(base_url).ok();
    let Ok(img) = Selector::parse("img") else {
        return Vec::new();
    };
    fragment
        .select(&img)
        .filter_map(image_source)
        .filter_map(|src| {
            let resolved = resolve_image_url(&src, base.as_ref());
            if resolved.is_none() {
                harvest_debug!("Skipping unresolvable image reference {:?}", src);
            }
            resolved
        })
        .collect()
}

/// Resolves an image reference the way a browser on `base` would, except that
/// protocol-relative references are always pinned to https.
pub fn resolve_image_url(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Url::parse(&format!("https://{rest}")).ok().map(String::from);
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(String::from)
}

/// Rewrites `src`/`data-src` of images whose resolved URL has a local copy.
///
/// Only `<img>` attributes change; other elements with the same reference
/// (`<source>`, `<video>`) are left alone. `html` is returned unchanged when
/// nothing matches.
pub fn rewrite_image_sources(
    html: &str,
    base_url: &str,
    replacements: &HashMap<String, String>,
) -> String {
    if replacements.is_empty() {
        return html.to_string();
    }
    let mut fragment = Html::parse_fragment(html);
    let base = Url::parse(base_url).ok();
    let Ok(img) = Selector::parse("img") else {
        return html.to_string();
    };

    let mut edits: Vec<(NodeId, &str, String)> = Vec::new();
    for element in fragment.select(&img) {
        for attr in ["src", "data-src"] {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            if let Some(local) = resolve_image_url(raw, base.as_ref())
                .and_then(|resolved| replacements.get(&resolved))
            {
                edits.push((element.id(), attr, local.clone()));
            }
        }
    }
    if edits.is_empty() {
        return html.to_string();
    }

    for (id, attr, local) in edits {
        let Some(mut node) = fragment.tree.get_mut(id) else {
            continue;
        };
        if let Node::Element(element) = node.value() {
            for (name, value) in element.attrs.iter_mut() {
                if &*name.local == attr {
                    *value = local.as_str().into();
                }
            }
        }
    }
    fragment.root_element().inner_html()
}

/// Local file name for an image URL: sanitized basename plus extension.
pub fn asset_file_name(url: &Url) -> String {
    let basename = url.path().rsplit('/').next().unwrap_or_default();
    let extension = Path::new(basename)
        .extension()
        .map(|ext| sanitize_filename(&ext.to_string_lossy()))
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let suffix = format!(".{extension}");

    let mut name = sanitize_filename(basename);
    if name.is_empty() {
        name = DEFAULT_STEM.to_string();
    }
    if !name.ends_with(&suffix) {
        name.push_str(&suffix);
    }
    name
}

/// Downloads post images into `<assets_dir>/<slug>/` and hands back site paths.
pub struct ImageDownloader {
    fetcher: Arc<dyn Fetcher>,
    assets_dir: PathBuf,
    url_prefix: String,
}

impl ImageDownloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, assets_dir: PathBuf, url_prefix: impl Into<String>) -> Self {
        Self {
            fetcher,
            assets_dir,
            url_prefix: url_prefix.into(),
        }
    }

    /// Fetches one image and returns `<prefix>/<slug>/<filename>`.
    pub async fn download(&self, url: &str, slug: &str) -> Result<String, AssetError> {
        let writer = AtomicFileWriter::new(self.assets_dir.join(slug));
        self.download_into(&writer, url, slug).await
    }

    async fn download_into(
        &self,
        writer: &AtomicFileWriter,
        url: &str,
        slug: &str,
    ) -> Result<String, AssetError> {
        let parsed = Url::parse(url).map_err(|_| AssetError::InvalidUrl(url.to_string()))?;
        let output = self.fetcher.fetch(url).await?;

        let filename = asset_file_name(&parsed);
        writer.write_bytes(&filename, &output.bytes)?;

        Ok(format!(
            "{}/{}/{}",
            self.url_prefix.trim_end_matches('/'),
            slug,
            filename
        ))
    }

    /// Downloads every image of `post`; failed images keep their remote URL.
    pub async fn localize(&self, post: BlogPost) -> BlogPost {
        if post.images.is_empty() {
            return post;
        }

        let writer = AtomicFileWriter::new(self.assets_dir.join(&post.slug));
        let mut downloaded: HashMap<String, String> = HashMap::new();
        let mut images = Vec::with_capacity(post.images.len());
        for url in &post.images {
            if let Some(local) = downloaded.get(url) {
                images.push(local.clone());
                continue;
            }
            match self.download_into(&writer, url, &post.slug).await {
                Ok(local) => {
                    harvest_debug!("Downloaded image {} -> {}", url, local);
                    downloaded.insert(url.clone(), local.clone());
                    images.push(local);
                }
                Err(err) => {
                    harvest_warn!("Error downloading image {}: {}", url, err);
                    images.push(url.clone());
                }
            }
        }

        harvest_info!(
            "Stored {}/{} images for {}",
            downloaded.len(),
            post.images.len(),
            post.slug
        );
        let content = rewrite_image_sources(&post.content, &post.source_url, &downloaded);
        post.with_local_assets(images, content)
    }
}

fn image_source(element: ElementRef<'_>) -> Option<String> {
    non_empty_attr(element, "src").or_else(|| non_empty_attr(element, "data-src"))
}
