//! Rendering surface: template context in, markup out, element refs back

use serde::Serialize;
use std::sync::Arc;

use formset_schema::TabItemSchema;

use crate::dom::{ElementRef, TabRefs, VirtualElement};
use crate::error::TabsError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderVariant {
    Default,
    /// Every tab rendered at once, no tab links (flatten / pdf)
    Flat,
}

impl RenderVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderVariant::Default => "default",
            RenderVariant::Flat => "flat",
        }
    }
}

/// Ref names the three element groups are mounted under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRefKeys {
    pub panel: String,
    pub link: String,
    pub link_container: String,
}

impl TabRefKeys {
    pub fn for_component(key: &str) -> Self {
        Self {
            panel: format!("tab-{}", key),
            link: format!("tabLink-{}", key),
            link_container: format!("tabLi-{}", key),
        }
    }
}

/// Data handed to the `tab` template
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabTemplateContext {
    pub tab_key: String,
    pub tab_link_key: String,
    pub tab_likey: String,
    pub current_tab: usize,
    pub vertical_layout: bool,
    pub tab_item_components: Vec<Arc<TabItemSchema>>,
    /// Rendered children, one entry per active tab
    pub tab_components: Vec<String>,
}

/// The templating and DOM collaborator
pub trait Surface {
    fn render_template(
        &self,
        template: &str,
        ctx: &TabTemplateContext,
        variant: RenderVariant,
    ) -> String;

    /// Insert markup and return the element groups for `keys`
    fn mount(&self, markup: &str, keys: &TabRefKeys) -> Result<TabRefs>;
}

/// Renders plain markup and mounts it as [`VirtualElement`]s.
///
/// Mounting scans the markup for `ref="..."` attributes, so whatever was
/// rendered is exactly what gets attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualSurface;

impl VirtualSurface {
    pub fn new() -> Self {
        Self
    }

    fn mount_group(markup: &str, key: &str, tag: &str) -> Vec<ElementRef> {
        let needle = format!(r#"ref="{}""#, key);
        (0..markup.matches(&needle).count())
            .map(|_| VirtualElement::new(tag).with_attribute("ref", key).into_ref())
            .collect()
    }
}

impl Surface for VirtualSurface {
    fn render_template(
        &self,
        template: &str,
        ctx: &TabTemplateContext,
        variant: RenderVariant,
    ) -> String {
        let mut html = format!(
            r#"<div class="{}-container" data-template="{}" data-variant="{}">"#,
            escape_html(template),
            escape_html(template),
            variant.as_str()
        );

        if variant == RenderVariant::Default {
            let orientation = if ctx.vertical_layout {
                "nav-tabs-vertical"
            } else {
                "nav-tabs-horizontal"
            };
            html.push_str(&format!(r#"<ul class="nav nav-tabs {}">"#, orientation));
            for (index, tab) in ctx.tab_item_components.iter().enumerate() {
                let active = if index == ctx.current_tab { " active" } else { "" };
                html.push_str(&format!(
                    r##"<li ref="{}" class="nav-item{}"><a ref="{}" class="nav-link" href="#{}">{}</a></li>"##,
                    ctx.tab_likey,
                    active,
                    ctx.tab_link_key,
                    escape_html(&tab.key),
                    escape_html(&tab.label),
                ));
            }
            html.push_str("</ul>");
        }

        for (index, tab) in ctx.tab_item_components.iter().enumerate() {
            let body = ctx.tab_components.get(index).map(String::as_str).unwrap_or("");
            if variant == RenderVariant::Flat {
                html.push_str(&format!(
                    r#"<div ref="{}" class="card"><div class="card-header">{}</div>{}</div>"#,
                    ctx.tab_key,
                    escape_html(&tab.label),
                    body
                ));
            } else {
                let hidden = if index == ctx.current_tab {
                    ""
                } else {
                    r#" style="display: none""#
                };
                html.push_str(&format!(
                    r#"<div ref="{}" role="tabpanel" class="tab-pane"{}>{}</div>"#,
                    ctx.tab_key, hidden, body
                ));
            }
        }

        html.push_str("</div>");
        html
    }

    fn mount(&self, markup: &str, keys: &TabRefKeys) -> Result<TabRefs> {
        let refs = TabRefs {
            panels: Self::mount_group(markup, &keys.panel, "div"),
            links: Self::mount_group(markup, &keys.link, "a"),
            link_containers: Self::mount_group(markup, &keys.link_container, "li"),
        };
        if !refs.links.is_empty() && refs.links.len() != refs.panels.len() {
            return Err(TabsError::Mount(format!(
                "{} tab links for {} panels",
                refs.links.len(),
                refs.panels.len()
            )));
        }
        Ok(refs)
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TabTemplateContext {
        let keys = TabRefKeys::for_component("tabs");
        TabTemplateContext {
            tab_key: keys.panel,
            tab_link_key: keys.link,
            tab_likey: keys.link_container,
            current_tab: 0,
            vertical_layout: false,
            tab_item_components: vec![
                Arc::new(TabItemSchema::new("One", "tab1")),
                Arc::new(TabItemSchema::new("Two <b>", "tab2")),
            ],
            tab_components: vec!["<p>a</p>".to_string(), String::new()],
        }
    }

    #[test]
    fn test_context_serializes_with_template_names() {
        let value = serde_json::to_value(context()).unwrap();
        assert_eq!(value["tabKey"], "tab-tabs");
        assert_eq!(value["tabLinkKey"], "tabLink-tabs");
        assert_eq!(value["tabLikey"], "tabLi-tabs");
        assert_eq!(value["currentTab"], 0);
    }

    #[test]
    fn test_render_and_mount() {
        let surface = VirtualSurface::new();
        let html = surface.render_template("tab", &context(), RenderVariant::Default);
        assert!(html.contains("Two &lt;b&gt;"));

        let refs = surface
            .mount(&html, &TabRefKeys::for_component("tabs"))
            .unwrap();
        assert_eq!(refs.panels.len(), 2);
        assert_eq!(refs.links.len(), 2);
        assert_eq!(refs.link_containers.len(), 2);
        assert_eq!(refs.links[0].attribute("ref").as_deref(), Some("tabLink-tabs"));
    }

    #[test]
    fn test_flat_variant_has_no_links() {
        let surface = VirtualSurface::new();
        let html = surface.render_template("tab", &context(), RenderVariant::Flat);
        let refs = surface
            .mount(&html, &TabRefKeys::for_component("tabs"))
            .unwrap();

        assert_eq!(refs.panels.len(), 2);
        assert!(refs.links.is_empty());
        assert!(refs.link_containers.is_empty());
    }

    #[test]
    fn test_mount_rejects_unbalanced_markup() {
        let markup = r#"<a ref="tabLink-tabs"></a><a ref="tabLink-tabs"></a><div ref="tab-tabs"></div>"#;
        let result = VirtualSurface::new().mount(markup, &TabRefKeys::for_component("tabs"));
        assert!(matches!(result, Err(TabsError::Mount(_))));
    }
}
