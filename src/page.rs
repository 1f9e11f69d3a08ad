use dashboard::{DashboardError, Page, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

fn dom_error(context: &str, err: JsValue) -> DashboardError {
    DashboardError::Dom(format!("{}: {:?}", context, err))
}

/// The live document, seen through the controller's [`Page`] seam.
#[derive(Debug, Clone)]
pub struct BrowserPage {
    document: Document,
}

impl BrowserPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn from_window() -> Result<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| DashboardError::Dom("No document available".to_string()))
    }
}

impl Page for BrowserPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        match self.document.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("Invalid selector {}: {:?}", selector, err);
                None
            }
        }
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let nodes = match self.document.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                log::warn!("Invalid selector {}: {:?}", selector, err);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest(&self, element: &Element, selector: &str) -> Option<Element> {
        element.closest(selector).ok().flatten()
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().add_1(class) {
            log::warn!("Failed to add class {}: {:?}", class, err);
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().remove_1(class) {
            log::warn!("Failed to remove class {}: {:?}", class, err);
        }
    }

    fn toggle_class(&self, element: &Element, class: &str) -> bool {
        match element.class_list().toggle(class) {
            Ok(present) => present,
            Err(err) => {
                log::warn!("Failed to toggle class {}: {:?}", class, err);
                self.has_class(element, class)
            }
        }
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn value(&self, element: &Element) -> Option<String> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            Some(select.value())
        } else {
            element.get_attribute("value")
        }
    }

    fn data(&self, element: &Element, key: &str) -> Option<String> {
        element.get_attribute(&format!("data-{}", key))
    }

    fn create_element(&self, tag: &str, class_name: &str, text: &str) -> Result<Element> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|err| dom_error("Failed to create element", err))?;
        element.set_class_name(class_name);
        element.set_text_content(Some(text));
        Ok(element)
    }

    fn append_to_body(&self, element: &Element) -> Result<()> {
        let body = self
            .document
            .body()
            .ok_or_else(|| DashboardError::Dom("Document has no body".to_string()))?;
        body.append_child(element)
            .map_err(|err| dom_error("Failed to append element", err))?;
        Ok(())
    }

    fn remove_element(&self, element: &Element) {
        element.remove();
    }

    fn listen(&self, element: &Element, event: &str, handler: Box<dyn FnMut()>) -> Result<()> {
        let closure = Closure::wrap(handler);
        element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| dom_error("Failed to attach listener", err))?;
        // Listeners live as long as the page.
        closure.forget();
        Ok(())
    }
}
