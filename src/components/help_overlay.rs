use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct HelpOverlayProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component(HelpOverlay)]
pub fn help_overlay(props: &HelpOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            // Keep the click from starting a drag underneath.
            e.stop_propagation();
            cb.emit(())
        })
    };
    let swallow = Callback::from(|e: MouseEvent| e.stop_propagation());
    html! {
        <div onmousedown={swallow} style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; color:#c9d1d9; font-family:sans-serif; font-size:13px; line-height:1.4; max-width:280px;">
            <div style="font-weight:600; margin-bottom:6px; color:#58a6ff;">{"Mandelbrot Viewer"}</div>
            <ul style="margin:0 0 8px 16px; padding:0;">
                <li>{"Drag with the mouse to pan."}</li>
                <li>{"Scroll to zoom toward the cursor."}</li>
                <li>{"Press R to reset the view."}</li>
            </ul>
            <button onmousedown={close}>{"Got it"}</button>
        </div>
    }
}
