//! Tag filter construction for series selection
//!
//! A usage query selects series by exactly two tags: the descriptor name
//! fixed per resource kind, and the base image the container was started
//! from.

use crate::models::{ResourceKind, TagFilter};

/// Tag holding the image a container was started from
pub const CONTAINER_IMAGE_TAG: &str = "container_base_image";

/// Tag holding the collector's descriptor name for the series
pub const DESCRIPTOR_TAG: &str = "descriptor_name";

/// Build the tag filter selecting usage series of `kind` for `image`.
///
/// With `exact_match` the image tag must equal `image` verbatim; otherwise
/// any tag on the same repository matches. The repository is everything
/// before the first `:`, so an image without a tag is used as-is.
pub fn build_tag_filter(kind: ResourceKind, image: &str, exact_match: bool) -> TagFilter {
    let mut filter = TagFilter::new();

    filter.insert(
        DESCRIPTOR_TAG.to_string(),
        kind.descriptor_name().to_string(),
    );

    let image_pattern = if exact_match {
        image.to_string()
    } else {
        let repository = image.split_once(':').map(|(repo, _)| repo).unwrap_or(image);
        format!("{}:*", repository)
    };
    filter.insert(CONTAINER_IMAGE_TAG.to_string(), image_pattern);

    filter
}
