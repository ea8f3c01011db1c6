//! Structural element rewriting
//!
//! Walks the parsed editor document in document order and rewrites each
//! element into its note markup form. Dispatch is keyed on the normalized
//! tag name; elements of a handled kind are renamed/rebuilt, everything
//! else is kept when the policy allows the tag and deleted outright when it
//! does not. The specific handlers run first because they legitimately turn
//! disallowed tags (`img`, `object`, `a`, `input`) into allowed ones
//! (`en-media`, `en-crypt`, `en-todo`); the delete-unless-whitelisted rule
//! only ever sees tags with no handler.
//!
//! The walk also accumulates the resource reference sequence: every media
//! or formula element contributes its `lid` in document order, duplicates
//! included. After the pass this sequence is the authoritative set of
//! resources the note still references; the persistence layer reconciles
//! orphans against it.

use crate::dom;
use crate::policy::TagPolicy;
use log::debug;
use markup5ever_rcdom::Handle;
use std::rc::Rc;

/// What the dispatcher decided to do with one element.
enum RewriteAction {
    /// Keep the element (possibly with attributes edited in place).
    Keep,
    /// Substitute a freshly built element; its content is already final.
    Replace(Handle),
    /// Drop the element but splice its (rewritten) children in its place.
    Unwrap,
    /// Delete the element and everything under it.
    Remove,
}

/// Result of a rewrite pass over one document.
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    /// Resource identifiers referenced by the rewritten document, in
    /// document order, duplicates preserved.
    pub resources: Vec<i32>,
}

/// Rewrite the subtree under `root` (normally the `<body>` element) into
/// note markup form, driven by `policy`.
pub fn rewrite_document(root: &Handle, policy: &TagPolicy) -> RewriteOutcome {
    let mut rewriter = Rewriter {
        policy,
        resources: Vec::new(),
    };
    rewriter.rewrite_children(root);
    RewriteOutcome {
        resources: rewriter.resources,
    }
}

struct Rewriter<'a> {
    policy: &'a TagPolicy,
    resources: Vec<i32>,
}

impl Rewriter<'_> {
    fn rewrite_children(&mut self, parent: &Handle) {
        let original: Vec<Handle> = parent.children.borrow().clone();
        let mut rebuilt: Vec<Handle> = Vec::with_capacity(original.len());

        for child in original {
            let Some(tag) = dom::element_name(&child) else {
                rebuilt.push(child);
                continue;
            };
            match self.rewrite_element(&child, &tag) {
                RewriteAction::Keep => {
                    self.rewrite_children(&child);
                    rebuilt.push(child);
                }
                RewriteAction::Replace(new_node) => {
                    rebuilt.push(new_node);
                }
                RewriteAction::Unwrap => {
                    self.rewrite_children(&child);
                    rebuilt.extend(child.children.borrow().iter().cloned());
                }
                RewriteAction::Remove => {}
            }
        }

        for node in &rebuilt {
            node.parent.set(Some(Rc::downgrade(parent)));
        }
        *parent.children.borrow_mut() = rebuilt;
    }

    fn rewrite_element(&mut self, node: &Handle, tag: &str) -> RewriteAction {
        match tag {
            "input" => self.rewrite_todo(node),
            "a" => self.rewrite_anchor(node),
            "object" => self.rewrite_object(node),
            "img" => self.rewrite_image(node),
            "span" => {
                // Identifiers have no meaning once persisted.
                dom::remove_attribute(node, "id");
                RewriteAction::Keep
            }
            _ if self.policy.element_allowed(tag) => RewriteAction::Keep,
            _ => {
                debug!("deleting <{tag}>: no note markup equivalent");
                RewriteAction::Remove
            }
        }
    }

    /// Checkbox input → `en-todo`. The checked state survives only as
    /// `checked="true"`; unchecked boxes carry no attribute at all.
    fn rewrite_todo(&mut self, node: &Handle) -> RewriteAction {
        let checked = dom::has_attribute(node, "checked");
        let mut attrs = dom::attributes(node);
        attrs.retain(|(name, _)| {
            name != "style" && name != "type" && name != "checked" && self.policy.attribute_allowed(name)
        });
        if checked {
            attrs.push(("checked".to_string(), "true".to_string()));
        }
        RewriteAction::Replace(dom::create_element("en-todo", attrs))
    }

    /// Media anchors become leaf `en-media` elements; formula links are
    /// unwrapped so the rendered preview image stands on its own; plain
    /// links just lose their forbidden attributes.
    fn rewrite_anchor(&mut self, node: &Handle) -> RewriteAction {
        let en_tag = dom::get_attribute(node, "en-tag").unwrap_or_default();
        if en_tag.eq_ignore_ascii_case("en-media") {
            self.record_resource(dom::get_attribute(node, "lid"));
            let mut attrs = dom::attributes(node);
            attrs.retain(|(name, _)| {
                name != "style"
                    && name != "href"
                    && name != "title"
                    && self.policy.attribute_allowed(name)
            });
            return RewriteAction::Replace(dom::create_element("en-media", attrs));
        }

        let href = dom::get_attribute(node, "href").unwrap_or_default();
        if href.to_ascii_lowercase().starts_with("latex://") {
            return RewriteAction::Unwrap;
        }

        let policy = self.policy;
        dom::retain_attributes(node, |name| policy.attribute_allowed(name));
        RewriteAction::Keep
    }

    /// Only PDF embeds with a positive resource identifier have a markup
    /// equivalent; every other object is deleted.
    fn rewrite_object(&mut self, node: &Handle) -> RewriteAction {
        let mime = dom::get_attribute(node, "type").unwrap_or_default();
        if mime != "application/pdf" {
            return RewriteAction::Remove;
        }
        let lid = dom::get_attribute(node, "lid")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|lid| *lid > 0);
        let Some(lid) = lid else {
            debug!("deleting PDF <object> without a positive lid");
            return RewriteAction::Remove;
        };

        self.resources.push(lid);
        let mut attrs = dom::attributes(node);
        attrs.retain(|(name, _)| {
            name != "width"
                && name != "height"
                && name != "border"
                && self.policy.attribute_allowed(name)
        });
        RewriteAction::Replace(dom::create_element("en-media", attrs))
    }

    /// Images carry the editor's `en-tag` marker: encryption placeholders
    /// become `en-crypt`, temporary preview artifacts vanish, everything
    /// else is a media reference.
    fn rewrite_image(&mut self, node: &Handle) -> RewriteAction {
        let en_tag = dom::get_attribute(node, "en-tag")
            .unwrap_or_default()
            .to_ascii_lowercase();

        if en_tag == "en-crypt" {
            let payload = dom::get_attribute(node, "alt").unwrap_or_default();
            let cipher = dom::get_attribute(node, "cipher").unwrap_or_else(|| "RC2".to_string());
            let length = dom::get_attribute(node, "length").unwrap_or_else(|| "64".to_string());
            let hint = dom::get_attribute(node, "hint").unwrap_or_default();
            let crypt = dom::create_element(
                "en-crypt",
                vec![
                    ("cipher".to_string(), cipher),
                    ("length".to_string(), length),
                    ("hint".to_string(), hint),
                ],
            );
            crypt.children.borrow_mut().push(dom::create_text(&payload));
            return RewriteAction::Replace(crypt);
        }

        if en_tag == "temporary" {
            return RewriteAction::Remove;
        }

        self.record_resource(dom::get_attribute(node, "lid"));
        let mut attrs = dom::attributes(node);
        attrs.retain(|(name, _)| self.policy.attribute_allowed(name));
        RewriteAction::Replace(dom::create_element("en-media", attrs))
    }

    /// Reference bookkeeping only: a missing or non-numeric identifier is a
    /// caller defect worth a log line, never a conversion failure.
    fn record_resource(&mut self, lid: Option<String>) {
        match lid.as_deref().map(str::trim).map(str::parse::<i32>) {
            Some(Ok(lid)) => self.resources.push(lid),
            Some(Err(_)) => debug!("skipping malformed resource identifier {lid:?}"),
            None => debug!("media element without a resource identifier"),
        }
    }
}
