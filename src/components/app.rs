use yew::prelude::*;

use super::HomePage;

#[function_component(App)]
pub fn app() -> Html {
    html! { <HomePage /> }
}
