use std::rc::Rc;

use crate::dialog::Dialog;
use crate::dom::NodeId;
use crate::page::Page;
use crate::{Error, Result};

/// Submit interceptor for a modal-backed form.
///
/// All handles are looked up once at [`FormWiring::resolve`] time and
/// injected into the installed handlers; nothing consults the id index while
/// an event is in flight. Registering wires two listeners:
///
/// - `submit` on the form: prevent the default submission, hide the dialog,
///   hide the trigger button, show the message element;
/// - `click` on the trigger button: open the dialog.
///
/// The submit handler is idempotent; dispatching `submit` twice leaves the
/// dialog closed, the trigger hidden, and the message visible.
pub struct FormWiring {
    form: NodeId,
    dialog: Rc<dyn Dialog>,
    trigger: NodeId,
    message: NodeId,
}

impl FormWiring {
    pub fn resolve(
        page: &Page,
        form_id: &str,
        dialog: Rc<dyn Dialog>,
        trigger_id: &str,
        message_id: &str,
    ) -> Result<Self> {
        let form = page.element_by_id(form_id)?;
        let actual = page.tag_name(form).unwrap_or_default().to_string();
        if !actual.eq_ignore_ascii_case("form") {
            return Err(Error::TagMismatch {
                id: form_id.to_string(),
                expected: "form".to_string(),
                actual,
            });
        }

        Ok(Self {
            form,
            dialog,
            trigger: page.element_by_id(trigger_id)?,
            message: page.element_by_id(message_id)?,
        })
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn register(self, page: &mut Page) -> Result<()> {
        let dialog = Rc::clone(&self.dialog);
        let trigger = self.trigger;
        let message = self.message;
        page.add_event_listener(
            self.form,
            "submit",
            false,
            Rc::new(move |page, event| {
                event.prevent_default();
                dialog.hide(page)?;
                page.hide(trigger)?;
                page.show(message)
            }),
        );

        let dialog = self.dialog;
        page.add_event_listener(
            trigger,
            "click",
            false,
            Rc::new(move |page, _event| dialog.show(page)),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::ModalDialog;

    fn upload_page() -> Result<Page> {
        let mut page = Page::new();
        page.append_to_body("button", &[("id", "btnNewForm"), ("type", "button")])?;
        let modal = page.append_to_body(
            "div",
            &[("id", "formModal"), ("class", "modal"), ("style", "display: none;")],
        )?;
        let form = page.append_element(modal, "form", &[("id", "formNewFolder")])?;
        page.append_element(form, "input", &[("id", "folderName"), ("type", "text")])?;
        page.append_element(form, "button", &[("id", "btnCreate"), ("type", "submit")])?;
        let message = page.append_to_body("p", &[("id", "message"), ("style", "display: none;")])?;
        page.append_text(message, "Folder created.")?;
        Ok(page)
    }

    fn wire(page: &mut Page) -> Result<()> {
        let dialog = Rc::new(ModalDialog::resolve(page, "formModal")?);
        FormWiring::resolve(page, "formNewFolder", dialog, "btnNewForm", "message")?
            .register(page)
    }

    #[test]
    fn submit_prevents_default_and_swaps_visibility() -> Result<()> {
        let mut page = upload_page()?;
        wire(&mut page)?;

        let outcome = page.submit("formNewFolder")?;
        assert!(outcome.default_prevented());
        page.assert_hidden("formModal")?;
        page.assert_hidden("btnNewForm")?;
        page.assert_visible("message")?;
        Ok(())
    }

    #[test]
    fn second_submit_leaves_the_final_states_unchanged() -> Result<()> {
        let mut page = upload_page()?;
        wire(&mut page)?;

        page.submit("formNewFolder")?;
        let outcome = page.submit("formNewFolder")?;
        assert!(outcome.default_prevented());
        page.assert_hidden("formModal")?;
        page.assert_hidden("btnNewForm")?;
        page.assert_visible("message")?;
        Ok(())
    }

    #[test]
    fn trigger_click_opens_the_dialog() -> Result<()> {
        let mut page = upload_page()?;
        wire(&mut page)?;

        page.assert_hidden("formModal")?;
        page.click("btnNewForm")?;
        page.assert_visible("formModal")?;
        Ok(())
    }

    #[test]
    fn resolve_reports_each_missing_element() -> Result<()> {
        let mut page = Page::new();
        page.append_to_body("form", &[("id", "formNewFolder")])?;
        page.append_to_body("div", &[("id", "formModal")])?;
        let dialog = Rc::new(ModalDialog::resolve(&page, "formModal")?);

        let missing_trigger =
            FormWiring::resolve(&page, "formNewFolder", Rc::clone(&dialog) as Rc<dyn Dialog>, "btnNewForm", "message");
        assert!(matches!(
            missing_trigger,
            Err(Error::ElementNotFound(id)) if id == "btnNewForm"
        ));

        page.append_to_body("button", &[("id", "btnNewForm")])?;
        let missing_message =
            FormWiring::resolve(&page, "formNewFolder", dialog, "btnNewForm", "message");
        assert!(matches!(
            missing_message,
            Err(Error::ElementNotFound(id)) if id == "message"
        ));
        Ok(())
    }

    #[test]
    fn resolve_rejects_a_non_form_target() -> Result<()> {
        let mut page = Page::new();
        page.append_to_body("div", &[("id", "notAForm")])?;
        page.append_to_body("div", &[("id", "formModal")])?;
        page.append_to_body("button", &[("id", "btnNewForm")])?;
        page.append_to_body("p", &[("id", "message")])?;
        let dialog = Rc::new(ModalDialog::resolve(&page, "formModal")?);

        match FormWiring::resolve(&page, "notAForm", dialog, "btnNewForm", "message") {
            Err(Error::TagMismatch { id, expected, actual }) => {
                assert_eq!(id, "notAForm");
                assert_eq!(expected, "form");
                assert_eq!(actual, "div");
            }
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
        Ok(())
    }
}
