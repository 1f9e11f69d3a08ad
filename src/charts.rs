use dashboard::{figure, ChartBackend, ChartSpec, DashboardError, Result};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = newPlot, catch)]
    fn new_plot(
        div_id: &str,
        data: JsValue,
        layout: JsValue,
        config: JsValue,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = Plotly, catch)]
    fn react(
        div_id: &str,
        data: JsValue,
        layout: JsValue,
        config: JsValue,
    ) -> std::result::Result<JsValue, JsValue>;
}

type PlotFn = fn(&str, JsValue, JsValue, JsValue) -> std::result::Result<JsValue, JsValue>;

/// Charts drawn with the page's global `Plotly`. A chart is addressed by the
/// id of the div it was drawn into.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotlyCharts;

impl ChartBackend for PlotlyCharts {
    type Handle = String;

    fn create(&self, anchor_id: &str, spec: &ChartSpec) -> Result<String> {
        draw(new_plot, anchor_id, spec)?;
        Ok(anchor_id.to_string())
    }

    fn update(&self, handle: &String, spec: &ChartSpec) -> Result<()> {
        draw(react, handle, spec)
    }
}

fn draw(plot: PlotFn, div_id: &str, spec: &ChartSpec) -> Result<()> {
    let figure = figure(spec)?;
    log::trace!("Plotting #{}", div_id);

    plot(
        div_id,
        to_js(&figure.data)?,
        to_js(&figure.layout)?,
        to_js(&figure.config)?,
    )
    .map_err(|err| DashboardError::Chart(format!("Plotly rejected #{}: {:?}", div_id, err)))?;
    Ok(())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| DashboardError::Chart(format!("Failed to convert figure: {}", err)))
}
