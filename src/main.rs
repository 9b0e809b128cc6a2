//! Main module for the stroke tempo application using Yew.
//! Wires UI components, state hooks, and the cycle scheduler.

use stroke_tempo::scheduler::CycleScheduler;
use stroke_tempo::timer::BrowserDelays;
use stroke_tempo::{stroke_keyframes, PaceError, PaceField, PaceModel};
use web_sys::HtmlInputElement;
use yew::prelude::*;

mod components;
mod config;
mod dom;
mod utils;

use components::{render_pace_field, render_rower};
use config::{CADENCE_INPUT_ID, DRIVE_INPUT_ID, RECOVER_INPUT_ID};
use dom::DomStrokeEffects;
use utils::{format_pace_value, keyframe_style};

/// Primary application component wiring state, effects, and UI elements.
#[function_component(Main)]
fn main_component() -> Html {
    let model = use_mut_ref(PaceModel::new);
    let scheduler = use_mut_ref(|| CycleScheduler::new(DomStrokeEffects::new(), BrowserDelays));

    // Text states for the three pace fields.
    let cadence_text = use_state(String::new);
    let drive_text = use_state(String::new);
    let recover_text = use_state(String::new);

    let pace_error = use_state(|| None::<String>);
    let running = use_state(|| false);

    // --- OnInput handlers for the text states ---
    let cadence_oninput = {
        let setter = cadence_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            setter.set(input.value());
        })
    };
    let drive_oninput = {
        let setter = drive_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            setter.set(input.value());
        })
    };
    let recover_oninput = {
        let setter = recover_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            setter.set(input.value());
        })
    };

    // Committing an edit always halts a running cycle, then derives the
    // remaining field once two distinct fields have been supplied, and
    // finally refreshes every displayed value from the model.
    let commit_edit = {
        let model = model.clone();
        let scheduler = scheduler.clone();
        let running = running.clone();
        let pace_error = pace_error.clone();
        let cadence_text = cadence_text.clone();
        let drive_text = drive_text.clone();
        let recover_text = recover_text.clone();
        Callback::from(move |(field, raw): (PaceField, String)| {
            scheduler.borrow().stop();
            running.set(false);

            let mut model = model.borrow_mut();
            model.record_edit(field, &raw);
            if model.ready_to_derive() {
                match model.derive_remaining() {
                    Ok(derived) => {
                        log::info!("derived {}", derived.label());
                        pace_error.set(None);
                    }
                    Err(PaceError::InvalidPace) => {
                        pace_error.set(Some(
                            "Those values don't add up to a stroke; please re-enter them."
                                .to_string(),
                        ));
                    }
                    Err(PaceError::Internal) => {
                        pace_error.set(Some(
                            "Something went wrong; the fields were cleared.".to_string(),
                        ));
                    }
                }
            }

            let settings = model.settings();
            cadence_text.set(format_pace_value(settings.cadence));
            drive_text.set(format_pace_value(settings.drive_time));
            recover_text.set(format_pace_value(settings.recover_time));
        })
    };

    // --- Commit handlers, one per field ---
    let cadence_commit = {
        let commit_edit = commit_edit.clone();
        let text = cadence_text.clone();
        Callback::from(move |_: ()| commit_edit.emit((PaceField::Cadence, (*text).clone())))
    };
    let drive_commit = {
        let commit_edit = commit_edit.clone();
        let text = drive_text.clone();
        Callback::from(move |_: ()| commit_edit.emit((PaceField::DriveTime, (*text).clone())))
    };
    let recover_commit = {
        let commit_edit = commit_edit.clone();
        let text = recover_text.clone();
        Callback::from(move |_: ()| commit_edit.emit((PaceField::RecoverTime, (*text).clone())))
    };

    // --- KeyDown handlers for the Enter key ---
    let cadence_onkeydown = {
        let commit_handler = cadence_commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                commit_handler.emit(());
            }
        })
    };
    let drive_onkeydown = {
        let commit_handler = drive_commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                commit_handler.emit(());
            }
        })
    };
    let recover_onkeydown = {
        let commit_handler = recover_commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                commit_handler.emit(());
            }
        })
    };

    // Toggle per the start/stop contract: stop when running, otherwise
    // hand the model's current pace to the scheduler.
    let on_toggle = {
        let model = model.clone();
        let scheduler = scheduler.clone();
        let running = running.clone();
        Callback::from(move |_: MouseEvent| {
            let scheduler = scheduler.borrow();
            if scheduler.is_running() {
                scheduler.stop();
            } else {
                scheduler.start(model.borrow().settings());
            }
            running.set(scheduler.is_running());
        })
    };

    let on_reset = {
        let model = model.clone();
        let scheduler = scheduler.clone();
        let running = running.clone();
        let pace_error = pace_error.clone();
        let cadence_text = cadence_text.clone();
        let drive_text = drive_text.clone();
        let recover_text = recover_text.clone();
        Callback::from(move |_: MouseEvent| {
            model.borrow_mut().reset();
            scheduler.borrow().stop();
            running.set(false);
            pace_error.set(None);
            cadence_text.set(String::new());
            drive_text.set(String::new());
            recover_text.set(String::new());
        })
    };

    let keyframes = stroke_keyframes(&model.borrow().settings());
    let can_start = keyframes.is_some();

    html! {
        <div class="container">
            <h1>{ "Stroke Tempo" }</h1>
            <p class="tagline">{ "Set any two values; the third follows." }</p>

            <div class="pace-controls">
                { render_pace_field(
                    CADENCE_INPUT_ID,
                    "Cadence",
                    "spm",
                    (*cadence_text).clone(),
                    cadence_oninput,
                    cadence_commit.reform(|_| ()),
                    cadence_onkeydown,
                ) }
                { render_pace_field(
                    DRIVE_INPUT_ID,
                    "Drive time",
                    "s",
                    (*drive_text).clone(),
                    drive_oninput,
                    drive_commit.reform(|_| ()),
                    drive_onkeydown,
                ) }
                { render_pace_field(
                    RECOVER_INPUT_ID,
                    "Recover time",
                    "s",
                    (*recover_text).clone(),
                    recover_oninput,
                    recover_commit.reform(|_| ()),
                    recover_onkeydown,
                ) }
            </div>

            if let Some(ref message) = *pace_error {
                <div class="input-error">{ message.clone() }</div>
            }

            { render_rower(keyframe_style(keyframes), *running) }

            <div class="transport">
                <button
                    class="btn-primary"
                    onclick={on_toggle}
                    disabled={!can_start && !*running}
                >
                    { if *running { "Stop" } else { "Row" } }
                </button>
                <button class="btn-secondary" onclick={on_reset}>{ "Reset" }</button>
            </div>
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<Main>::new().render();
}
