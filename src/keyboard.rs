use std::rc::Rc;

use crate::events::EventState;
use crate::page::Page;
use crate::Result;

// The loggers never fail: an event without a key payload logs an empty
// identifier.

pub fn log_key_down(page: &mut Page, event: &EventState) {
    page.console_log(format!("Key down: {}", event.key().unwrap_or_default()));
}

pub fn log_key_press(page: &mut Page, event: &EventState) {
    page.console_log(format!("Key press: {}", event.key().unwrap_or_default()));
}

pub fn log_key_up(page: &mut Page, event: &EventState) {
    page.console_log(format!("Key up: {}", event.key().unwrap_or_default()));
}

/// Wires all three loggers to `keydown`/`keypress`/`keyup` on one element.
/// Nothing attaches them implicitly; calling the loggers directly works too.
pub fn attach_key_loggers(page: &mut Page, id: &str) -> Result<()> {
    let target = page.element_by_id(id)?;
    page.add_event_listener(
        target,
        "keydown",
        false,
        Rc::new(|page, event| {
            log_key_down(page, event);
            Ok(())
        }),
    );
    page.add_event_listener(
        target,
        "keypress",
        false,
        Rc::new(|page, event| {
            log_key_press(page, event);
            Ok(())
        }),
    );
    page.add_event_listener(
        target,
        "keyup",
        false,
        Rc::new(|page, event| {
            log_key_up(page, event);
            Ok(())
        }),
    );
    Ok(())
}
