//! Pure update function for the viewer.
//!
//! `update()` mutates the model for one message and returns the command the
//! runtime should execute. No I/O happens here.

use crate::session::Session;

use super::input::{InputAction, resolve_key};
use super::model::{JUMP_INPUT_MAX, LoadState, ViewerCmd, ViewerModel, ViewerMsg};

/// Apply a message to the model.
pub fn update(model: &mut ViewerModel, msg: ViewerMsg) -> ViewerCmd {
    match msg {
        ViewerMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            ViewerCmd::Redraw
        }

        ViewerMsg::Loaded(Ok(log)) => {
            model.report = Some(log.report);
            match Session::from_log(log) {
                Ok(mut session) => {
                    if model.start_at_end {
                        session.last();
                    }
                    model.state = LoadState::Ready(session);
                    ViewerCmd::Redraw
                }
                Err(err) => fail(model, err),
            }
        }

        ViewerMsg::Loaded(Err(err)) => fail(model, err),

        ViewerMsg::Key(key) => match resolve_key(&key) {
            Some(action) => apply_action(model, action),
            None => ViewerCmd::None,
        },
    }
}

fn fail(model: &mut ViewerModel, err: crate::core::errors::FwvError) -> ViewerCmd {
    model.state = LoadState::Failed(err);
    model.quit = true;
    ViewerCmd::Quit
}

fn apply_action(model: &mut ViewerModel, action: InputAction) -> ViewerCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            return ViewerCmd::Quit;
        }
        InputAction::ClearOrQuit => {
            if model.jump_input.is_empty() {
                model.quit = true;
                return ViewerCmd::Quit;
            }
            model.jump_input.clear();
            model.status = None;
            return ViewerCmd::Redraw;
        }
        InputAction::ToggleHelp => {
            model.show_help = !model.show_help;
            return ViewerCmd::Redraw;
        }
        InputAction::JumpDigit(c) => {
            if model.jump_input.len() < JUMP_INPUT_MAX {
                model.jump_input.push(c);
            }
            return ViewerCmd::Redraw;
        }
        InputAction::JumpBackspace => {
            model.jump_input.pop();
            return ViewerCmd::Redraw;
        }
        InputAction::JumpSubmit => {
            let input = std::mem::take(&mut model.jump_input);
            return submit_jump(model, &input);
        }
        _ => {}
    }

    // Remaining actions need a loaded session.
    let Some(session) = model.session_mut() else {
        return ViewerCmd::None;
    };
    let moved = match action {
        InputAction::Step(direction) => session.step(direction),
        InputAction::Page(direction) => session.page(direction),
        InputAction::First => session.first(),
        InputAction::Last => session.last(),
        _ => false,
    };
    if moved {
        model.status = None;
        ViewerCmd::Redraw
    } else {
        ViewerCmd::None
    }
}

fn submit_jump(model: &mut ViewerModel, input: &str) -> ViewerCmd {
    if input.trim().is_empty() {
        return ViewerCmd::None;
    }
    let Some(session) = model.session_mut() else {
        return ViewerCmd::None;
    };
    let outcome = session.jump(input);
    if outcome.is_accepted() {
        model.set_info(outcome.to_string());
        ViewerCmd::Redraw
    } else {
        model.set_warning(outcome.to_string());
        ViewerCmd::JumpRejected(outcome)
    }
}
