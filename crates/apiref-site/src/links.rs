//! Link integrity check across rendered pages.

use std::collections::{BTreeSet, HashMap, HashSet};

use apiref_meta::Warning;
use apiref_renderer::RenderedPage;

/// Report every emitted link whose page or anchor was not rendered.
///
/// Each missing target is reported once per linking page, in page order.
#[must_use]
pub fn check_links(pages: &[RenderedPage]) -> Vec<Warning> {
    let anchors: HashMap<&str, HashSet<&str>> = pages
        .iter()
        .map(|page| {
            (
                page.module.as_str(),
                page.anchors.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut warnings = Vec::new();
    for page in pages {
        let targets: BTreeSet<(&str, &str)> = page
            .links
            .iter()
            .map(|link| (link.module.as_str(), link.anchor.as_str()))
            .collect();
        for (module, anchor) in targets {
            let found = anchors
                .get(module)
                .is_some_and(|defined| defined.contains(anchor));
            if !found {
                warnings.push(Warning::DanglingLink {
                    from_module: page.module.clone(),
                    target_module: module.to_owned(),
                    anchor: anchor.to_owned(),
                });
            }
        }
    }
    warnings
}
