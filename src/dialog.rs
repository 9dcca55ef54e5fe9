use crate::dom::NodeId;
use crate::page::Page;
use crate::Result;

/// Show/hide capability over some overlay element. The form wiring only
/// depends on this trait, so any modal implementation can stand in.
pub trait Dialog {
    fn show(&self, page: &mut Page) -> Result<()>;
    fn hide(&self, page: &mut Page) -> Result<()>;
    fn is_open(&self, page: &Page) -> Result<bool>;
}

/// Dialog backed by one element, resolved once at construction time.
/// Showing adds the `show` class, clears `display: none`, and flips
/// `aria-hidden`; hiding reverses all three. Both directions are
/// idempotent.
#[derive(Debug, Clone, Copy)]
pub struct ModalDialog {
    node: NodeId,
}

impl ModalDialog {
    pub fn resolve(page: &Page, id: &str) -> Result<Self> {
        Ok(Self {
            node: page.element_by_id(id)?,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Dialog for ModalDialog {
    fn show(&self, page: &mut Page) -> Result<()> {
        page.show(self.node)?;
        page.add_class(self.node, "show")?;
        page.set_attr(self.node, "aria-hidden", "false")
    }

    fn hide(&self, page: &mut Page) -> Result<()> {
        page.hide(self.node)?;
        page.remove_class(self.node, "show")?;
        page.set_attr(self.node, "aria-hidden", "true")
    }

    fn is_open(&self, page: &Page) -> Result<bool> {
        page.is_visible(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_modal() -> Result<(Page, ModalDialog)> {
        let mut page = Page::new();
        page.append_to_body("div", &[("id", "formModal"), ("class", "modal fade")])?;
        let dialog = ModalDialog::resolve(&page, "formModal")?;
        Ok((page, dialog))
    }

    #[test]
    fn hide_closes_and_marks_the_element() -> Result<()> {
        let (mut page, dialog) = page_with_modal()?;
        assert!(dialog.is_open(&page)?);

        dialog.hide(&mut page)?;
        assert!(!dialog.is_open(&page)?);
        assert!(!page.has_class(dialog.node(), "show"));
        assert_eq!(page.attr(dialog.node(), "aria-hidden").unwrap(), "true");
        Ok(())
    }

    #[test]
    fn show_reverses_hide() -> Result<()> {
        let (mut page, dialog) = page_with_modal()?;
        dialog.hide(&mut page)?;
        dialog.show(&mut page)?;

        assert!(dialog.is_open(&page)?);
        assert!(page.has_class(dialog.node(), "show"));
        assert_eq!(page.attr(dialog.node(), "aria-hidden").unwrap(), "false");
        Ok(())
    }

    #[test]
    fn hide_twice_leaves_the_same_state() -> Result<()> {
        let (mut page, dialog) = page_with_modal()?;
        dialog.hide(&mut page)?;
        let style_after_first = page.attr(dialog.node(), "style");
        let class_after_first = page.attr(dialog.node(), "class");

        dialog.hide(&mut page)?;
        assert_eq!(page.attr(dialog.node(), "style"), style_after_first);
        assert_eq!(page.attr(dialog.node(), "class"), class_after_first);
        assert!(!dialog.is_open(&page)?);
        Ok(())
    }

    #[test]
    fn hide_without_a_class_attribute_leaves_none_behind() -> Result<()> {
        let mut page = Page::new();
        page.append_to_body("div", &[("id", "bare")])?;
        let dialog = ModalDialog::resolve(&page, "bare")?;

        dialog.hide(&mut page)?;
        assert_eq!(page.attr(dialog.node(), "class"), None);
        assert!(!dialog.is_open(&page)?);
        Ok(())
    }

    #[test]
    fn resolve_requires_the_element_to_exist() {
        let page = Page::new();
        assert!(matches!(
            ModalDialog::resolve(&page, "formModal"),
            Err(crate::Error::ElementNotFound(id)) if id == "formModal"
        ));
    }
}
