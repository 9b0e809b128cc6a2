//! Stateless view fragments for the metronome UI.
//!
//! These render based on their arguments only; all state and callbacks
//! live in the main component.

use yew::prelude::*;

/// One labeled pace input. The text state lives in the caller; the commit
/// callback fires on change or Enter.
pub fn render_pace_field(
    id: &str,
    label: &str,
    unit: &str,
    value: String,
    oninput: Callback<InputEvent>,
    onchange: Callback<Event>,
    onkeydown: Callback<KeyboardEvent>,
) -> Html {
    html! {
        <div class="form-group">
            <label for={id.to_string()}>{ label }</label>
            <div class="field-with-unit">
                <input
                    type="number"
                    id={id.to_string()}
                    min="0"
                    step="0.01"
                    {value}
                    {oninput}
                    {onchange}
                    {onkeydown}
                />
                <span class="unit">{ unit }</span>
            </div>
        </div>
    }
}

/// The animated rower figure. The highlight classes are toggled directly
/// on the element by the effect layer while a cycle runs, so the id must
/// stay stable across re-renders.
pub fn render_rower(style: String, running: bool) -> Html {
    let class = classes!("rower", running.then_some("rowing"));
    html! {
        <div class="rower-stage">
            <div id={crate::config::ROWER_ID} {class} {style}>
                <span class="rower-icon">{ "🚣" }</span>
            </div>
        </div>
    }
}
