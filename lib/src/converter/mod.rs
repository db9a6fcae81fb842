use std::collections::BTreeMap;

use log::{debug, warn};
use lyon_geom::Point;
use roxmltree::{Document, Node};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::anchor::{estimate, strict_estimate};
use crate::LabelError;

mod visit;

/// Counts shown next to region names, keyed by region id or name
pub type Counts = BTreeMap<String, u64>;

/// Controls how labels are chosen and rendered
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LabelConfig {
    /// Decimal places kept for label coordinates
    pub precision: usize,
    /// CSS class of each `<text>`; the group wrapping them gets the plural
    pub class: String,
    /// Append the region's count to its name
    pub show_counts: bool,
    pub count_separator: String,
    pub font_size: Option<f64>,
    /// Leave out regions that have neither a name nor an id
    pub skip_unnamed: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            class: "region-label".to_owned(),
            show_counts: true,
            count_separator: " ".to_owned(),
            font_size: None,
            skip_unnamed: false,
        }
    }
}

/// One labelled area of a map
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// SVG path data outlining the region
    pub d: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: Option<u64>,
}

impl Region {
    /// Name used in logs and error messages
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.id.as_deref().unwrap_or("<unnamed>")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: Option<String>,
    pub name: String,
    pub count: Option<u64>,
    pub anchor: Point<f64>,
}

#[derive(Debug, Default)]
struct RegionVisitor {
    regions: Vec<Region>,
}

impl visit::XmlVisitor for RegionVisitor {
    fn visit(&mut self, node: Node) {
        if node.tag_name().name() != "path" {
            return;
        }

        let d = node.attribute("d").map(str::trim).unwrap_or_default();
        if d.is_empty() {
            warn!("There is a path node containing no actual path: {:?}", node);
            return;
        }

        let id = node.attribute("id").map(str::to_owned);
        let name = node
            .attribute("data-name")
            .or_else(|| {
                node.children()
                    .find(|child| child.has_tag_name("title"))
                    .and_then(|title| title.text())
            })
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(id.as_deref())
            .unwrap_or_default()
            .to_owned();

        self.regions.push(Region {
            id,
            name,
            d: d.to_owned(),
            count: None,
        });
    }
}

/// Collects every rendered `<path>` of a map as a [`Region`]
pub fn regions_from_document(doc: &Document) -> Result<Vec<Region>, LabelError> {
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(LabelError::NotSvg(root.tag_name().name().to_owned()));
    }

    let mut visitor = RegionVisitor::default();
    visit::depth_first_visit(doc, &mut visitor);
    debug!("Found {} regions", visitor.regions.len());
    Ok(visitor.regions)
}

/// Reads a JSON array of regions
#[cfg(feature = "serde")]
pub fn regions_from_json(input: &str) -> Result<Vec<Region>, LabelError> {
    Ok(serde_json::from_str(input)?)
}

/// Label every region, degrading gracefully on malformed path data
pub fn label_regions(regions: &[Region], counts: &Counts, config: &LabelConfig) -> Vec<Label> {
    regions
        .iter()
        .filter(|region| keep_region(region, config))
        .map(|region| {
            let estimate = estimate(&region.d);
            if !estimate.discarded.is_empty() {
                warn!(
                    "Discarded {} malformed token(s) in region {}",
                    estimate.discarded.len(),
                    region.display_name()
                );
            }
            to_label(region, counts, estimate.anchor)
        })
        .collect()
}

/// Label every region, failing on the first path that is not valid SVG path data
pub fn label_regions_strict(
    regions: &[Region],
    counts: &Counts,
    config: &LabelConfig,
) -> Result<Vec<Label>, LabelError> {
    regions
        .iter()
        .filter(|region| keep_region(region, config))
        .map(|region| {
            let estimate = strict_estimate(&region.d).map_err(|source| LabelError::Path {
                region: region.display_name().to_owned(),
                source,
            })?;
            Ok(to_label(region, counts, estimate.anchor))
        })
        .collect()
}

/// Convenience for [`regions_from_document`] followed by [`label_regions`]
pub fn label_document(
    doc: &Document,
    counts: &Counts,
    config: &LabelConfig,
) -> Result<Vec<Label>, LabelError> {
    Ok(label_regions(&regions_from_document(doc)?, counts, config))
}

fn keep_region(region: &Region, config: &LabelConfig) -> bool {
    let unnamed = region.name.is_empty() && region.id.is_none();
    if unnamed && config.skip_unnamed {
        debug!("Skipping unnamed region {}", region.d);
        false
    } else {
        true
    }
}

fn to_label(region: &Region, counts: &Counts, anchor: Point<f64>) -> Label {
    let count = region.count.or_else(|| {
        region
            .id
            .as_ref()
            .and_then(|id| counts.get(id))
            .or_else(|| counts.get(&region.name))
            .copied()
    });
    Label {
        id: region.id.clone(),
        name: region.name.clone(),
        count,
        anchor,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lyon_geom::point;
    use pretty_assertions::assert_eq;

    const MAP: &str = include_str!("../../tests/parishes.svg");

    fn counts() -> Counts {
        Counts::from([("north".to_owned(), 12), ("South & Coast".to_owned(), 3)])
    }

    #[test]
    fn regions_are_named_from_data_name_title_then_id() {
        let doc = Document::parse(MAP).unwrap();
        let regions = regions_from_document(&doc).unwrap();
        let names = regions
            .iter()
            .map(|region| region.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["North", "South & Coast", "island", ""]);
    }

    #[test]
    fn labels_sit_at_box_centers_with_counts() {
        let doc = Document::parse(MAP).unwrap();
        let labels = label_document(&doc, &counts(), &LabelConfig::default()).unwrap();
        assert_eq!(
            labels
                .iter()
                .map(|label| (label.name.as_str(), label.count, label.anchor))
                .collect::<Vec<_>>(),
            vec![
                ("North", Some(12), point(50., 20.)),
                ("South & Coast", Some(3), point(50., 70.)),
                ("island", None, point(85., 85.)),
                ("", None, point(15., 90.)),
            ]
        );
    }

    #[test]
    fn unnamed_regions_can_be_skipped() {
        let doc = Document::parse(MAP).unwrap();
        let config = LabelConfig {
            skip_unnamed: true,
            ..Default::default()
        };
        let labels = label_document(&doc, &Counts::new(), &config).unwrap();
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn region_count_wins_over_lookup() {
        let regions = [Region {
            id: Some("north".to_owned()),
            name: "North".to_owned(),
            d: "M 0 0 h 2 v 2".to_owned(),
            count: Some(40),
        }];
        let labels = label_regions(&regions, &counts(), &LabelConfig::default());
        assert_eq!(labels[0].count, Some(40));
        assert_eq!(labels[0].anchor, point(1., 1.));
    }

    #[test]
    fn strict_labelling_names_the_broken_region() {
        let regions = [Region {
            id: None,
            name: "Broken".to_owned(),
            d: "M 0 0 L 1 nope".to_owned(),
            count: None,
        }];
        let err = label_regions_strict(&regions, &Counts::new(), &LabelConfig::default())
            .unwrap_err();
        assert!(matches!(err, LabelError::Path { ref region, .. } if region == "Broken"));

        let labels = label_regions(&regions, &Counts::new(), &LabelConfig::default());
        assert_eq!(labels[0].anchor, point(0., 0.));
    }

    #[test]
    fn non_svg_documents_are_rejected() {
        let doc = Document::parse("<html><path d='M 0 0'/></html>").unwrap();
        assert!(matches!(
            regions_from_document(&doc),
            Err(LabelError::NotSvg(name)) if name == "html"
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn regions_load_from_json() {
        let regions = regions_from_json(
            r#"[
                {"id": "a", "name": "Alpha", "d": "M 0 0 L 4 4", "count": 7},
                {"name": "Beta", "d": "M 10 10"}
            ]"#,
        )
        .unwrap();
        assert_eq!(regions[1].id, None);
        let labels = label_regions(&regions, &Counts::new(), &LabelConfig::default());
        assert_eq!(labels[0].anchor, point(2., 2.));
        assert_eq!(labels[0].count, Some(7));
        assert_eq!(labels[1].anchor, point(10., 10.));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let config: LabelConfig = serde_json::from_str(r#"{"precision": 0}"#).unwrap();
        assert_eq!(
            config,
            LabelConfig {
                precision: 0,
                ..Default::default()
            }
        );
    }
}
