//! ELAN annotation documents
//!
//! Thin wrapper over the parsed XML tree. The submodules resolve the pieces
//! the aggregation needs: the time-slot table, the `runs` tier, and the
//! subject tiers.

mod runs;
mod tiers;
mod timeline;

pub use runs::{RunTable, RUNS_TIER, RUN_PREFIX};
pub use tiers::{RESERVED_TIERS, SCENARIO_TIME_TIER};
pub use timeline::Timeline;

use roxmltree::{Document, Node};

use crate::error::AnnotationError;
use crate::types::Interval;

const TIER: &str = "TIER";
const TIER_ID: &str = "TIER_ID";
const ALIGNABLE_ANNOTATION: &str = "ALIGNABLE_ANNOTATION";
const ANNOTATION_VALUE: &str = "ANNOTATION_VALUE";
const TIME_SLOT_REF1: &str = "TIME_SLOT_REF1";
const TIME_SLOT_REF2: &str = "TIME_SLOT_REF2";

/// A parsed .eaf document
pub struct EafDocument<'input> {
    doc: Document<'input>,
}

/// One labeled interval on a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation<'a> {
    pub interval: Interval,
    pub value: &'a str,
}

impl<'input> EafDocument<'input> {
    pub fn parse(xml: &'input str) -> Result<Self, AnnotationError> {
        Ok(Self {
            doc: Document::parse(xml)?,
        })
    }

    fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Direct child of the document root with the given tag
    fn section(&self, tag: &str) -> Option<Node<'_, 'input>> {
        self.root().children().find(|n| n.has_tag_name(tag))
    }

    fn tier_nodes(&self) -> impl Iterator<Item = Node<'_, 'input>> {
        self.root().children().filter(|n| n.has_tag_name(TIER))
    }

    fn tier_node(&self, tier_id: &str) -> Option<Node<'_, 'input>> {
        self.tier_nodes()
            .find(|n| n.attribute(TIER_ID) == Some(tier_id))
    }

    /// Resolve every annotation on a tier against the timeline, in document order
    pub fn tier_annotations(
        &self,
        tier_id: &str,
        timeline: &Timeline,
    ) -> Result<Vec<Annotation<'_>>, AnnotationError> {
        let tier = self
            .tier_node(tier_id)
            .ok_or_else(|| AnnotationError::MissingTier(tier_id.to_string()))?;

        tier.children()
            .filter(|n| n.is_element())
            .map(|annotation| resolve_annotation(annotation, timeline))
            .collect()
    }
}

fn resolve_annotation<'a, 'input>(
    annotation: Node<'a, 'input>,
    timeline: &Timeline,
) -> Result<Annotation<'a>, AnnotationError> {
    let aligned = child(annotation, ALIGNABLE_ANNOTATION)?;
    let start = timeline.resolve(required_attribute(aligned, TIME_SLOT_REF1)?)?;
    let end = timeline.resolve(required_attribute(aligned, TIME_SLOT_REF2)?)?;
    let value = child(aligned, ANNOTATION_VALUE)?.text().unwrap_or("");

    Ok(Annotation {
        interval: Interval::new(start, end),
        value,
    })
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Result<Node<'a, 'input>, AnnotationError> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .ok_or_else(|| AnnotationError::MissingElement {
            parent: node.tag_name().name().to_string(),
            child: tag.to_string(),
        })
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, AnnotationError> {
    node.attribute(name)
        .ok_or_else(|| AnnotationError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
        })
}


#[cfg(test)]
mod tests {
    use super::fixtures::eaf;
    use super::*;

    #[test]
    fn test_tier_annotations_resolve_times() {
        let xml = eaf(
            &[("ts1", 100), ("ts2", 200), ("ts3", 300)],
            &[("child_p1_a", &[("ts1", "ts2", "talk"), ("ts2", "ts3", "look")])],
        );
        let doc = EafDocument::parse(&xml).unwrap();
        let timeline = doc.timeline().unwrap();

        let annotations = doc.tier_annotations("child_p1_a", &timeline).unwrap();
        assert_eq!(
            annotations,
            vec![
                Annotation {
                    interval: Interval::new(100, 200),
                    value: "talk"
                },
                Annotation {
                    interval: Interval::new(200, 300),
                    value: "look"
                },
            ]
        );
    }

    #[test]
    fn test_missing_tier_is_error() {
        let xml = eaf(&[("ts1", 0)], &[]);
        let doc = EafDocument::parse(&xml).unwrap();
        let timeline = doc.timeline().unwrap();

        let err = doc.tier_annotations("nobody", &timeline).unwrap_err();
        assert!(matches!(err, AnnotationError::MissingTier(ref t) if t == "nobody"));
    }

    #[test]
    fn test_empty_annotation_value_reads_as_empty() {
        let xml = eaf(&[("ts1", 0), ("ts2", 10)], &[("t", &[("ts1", "ts2", "")])]);
        let doc = EafDocument::parse(&xml).unwrap();
        let timeline = doc.timeline().unwrap();

        let annotations = doc.tier_annotations("t", &timeline).unwrap();
        assert_eq!(annotations[0].value, "");
    }

    #[test]
    fn test_missing_alignable_annotation_is_error() {
        let xml = r#"<ANNOTATION_DOCUMENT>
            <TIME_ORDER><TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/></TIME_ORDER>
            <TIER TIER_ID="t"><ANNOTATION><REF_ANNOTATION ANNOTATION_REF="a1"/></ANNOTATION></TIER>
        </ANNOTATION_DOCUMENT>"#;
        let doc = EafDocument::parse(xml).unwrap();
        let timeline = doc.timeline().unwrap();

        let err = doc.tier_annotations("t", &timeline).unwrap_err();
        assert!(matches!(err, AnnotationError::MissingElement { .. }));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            EafDocument::parse("<ANNOTATION_DOCUMENT>"),
            Err(AnnotationError::Xml(_))
        ));
    }
}
