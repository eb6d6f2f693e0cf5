// src/app.rs
use std::rc::Rc;

use gloo::console::{error, log, warn};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::api::HttpBackend;
use crate::catalog::{self, ActivityCard, CatalogState, Generations, ParticipantRow, RemoveTarget, LOAD_FAILED};
use crate::config::AppConfig;
use crate::dispatch::{self, Flash, MessageBoard, Outcome};
use crate::session::{self, BrowserStore, Session, Visibility};

struct Services {
    backend: HttpBackend,
    store: BrowserStore,
    message_ttl_ms: u32,
}

impl Services {
    fn from_config() -> Rc<Self> {
        let cfg = AppConfig::load();
        Rc::new(Self {
            backend: HttpBackend::new(&cfg.api_base),
            store: BrowserStore::new(&cfg),
            message_ttl_ms: cfg.message_ttl_ms,
        })
    }
}

#[function_component(App)]
pub(crate) fn app() -> Html {
    let services: Rc<Services> = (*use_state(Services::from_config)).clone();

    let auth = use_state(Session::default);
    let catalog = use_state(|| CatalogState::Loading);
    let generations = use_mut_ref(Generations::default);

    let board = use_mut_ref(MessageBoard::default);
    let message = use_state(|| None::<Flash>);

    let menu_open = use_state(|| false);
    let login_open = use_state(|| false);
    let login_message = use_state(|| None::<Flash>);
    let login_username = use_state(String::new);
    let login_password = use_state(String::new);

    let email = use_state(String::new);
    let activity = use_state(String::new);

    // Full refetch; the new generation forces a fresh list instead of a diff.
    let refresh = {
        let services = services.clone();
        let catalog = catalog.clone();
        Callback::from(move |_: ()| {
            let services = services.clone();
            let catalog = catalog.clone();
            let generations = generations.clone();
            let generation = generations.borrow_mut().next();
            spawn_local(async move {
                let (state, err) = catalog::refresh(&services.backend, generation).await;
                if !generations.borrow().is_latest(generation) {
                    log!(format!("Dropping superseded activity load #{generation}"));
                    return;
                }
                if let Some(e) = err {
                    error!(format!("Error fetching activities: {e}"));
                }
                catalog.set(state);
            });
        })
    };

    // Each message gets its own ticket; a timer only hides the message it was armed for.
    let show_message = {
        let message = message.clone();
        let ttl = services.message_ttl_ms;
        Callback::from(move |flash: Flash| {
            let ticket = board.borrow_mut().show(flash.clone());
            message.set(Some(flash));
            let board = board.clone();
            let message = message.clone();
            Timeout::new(ttl, move || {
                if board.borrow_mut().expire(ticket) {
                    message.set(None);
                }
            })
            .forget();
        })
    };

    // Restore the session first so the first render already knows about delete buttons.
    {
        let services = services.clone();
        let auth = auth.clone();
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let (restored, err) = session::restore(&services.backend, &services.store).await;
                if let Some(e) = err {
                    warn!(format!("Session validation failed: {e}"));
                }
                auth.set(restored);
                refresh.emit(());
            });
            || ()
        });
    }

    let finish_action = {
        let refresh = refresh.clone();
        let show_message = show_message.clone();
        move |outcome: Outcome, context: &str| {
            if let Some(e) = &outcome.failure {
                error!(format!("{context}: {e}"));
            }
            if outcome.refresh {
                refresh.emit(());
            }
            show_message.emit(outcome.flash);
        }
    };

    let on_signup = {
        let services = services.clone();
        let auth = auth.clone();
        let email = email.clone();
        let activity = activity.clone();
        let finish_action = finish_action.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let services = services.clone();
            let current = (*auth).clone();
            let chosen = (*activity).clone();
            let student = (*email).clone();
            let email = email.clone();
            let activity = activity.clone();
            let finish_action = finish_action.clone();
            spawn_local(async move {
                let outcome = dispatch::signup(&services.backend, &current, &chosen, &student).await;
                if outcome.refresh {
                    email.set(String::new());
                    activity.set(String::new());
                }
                finish_action(outcome, "Error signing up");
            });
        })
    };

    let on_unregister = {
        let services = services.clone();
        let auth = auth.clone();
        Callback::from(move |target: RemoveTarget| {
            let services = services.clone();
            let current = (*auth).clone();
            let finish_action = finish_action.clone();
            spawn_local(async move {
                let outcome =
                    dispatch::unregister(&services.backend, &current, &target.activity, &target.email).await;
                finish_action(outcome, "Error unregistering");
            });
        })
    };

    let on_login = {
        let services = services.clone();
        let auth = auth.clone();
        let login_open = login_open.clone();
        let login_message = login_message.clone();
        let login_username = login_username.clone();
        let login_password = login_password.clone();
        let refresh = refresh.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let services = services.clone();
            let username = (*login_username).clone();
            let password = (*login_password).clone();
            let auth = auth.clone();
            let login_open = login_open.clone();
            let login_message = login_message.clone();
            let login_username = login_username.clone();
            let login_password = login_password.clone();
            let refresh = refresh.clone();
            spawn_local(async move {
                match session::login(&services.backend, &services.store, &username, &password).await {
                    Ok((signed_in, persist_err)) => {
                        if let Some(e) = persist_err {
                            error!(format!("Failed to save to LocalStorage: {e}"));
                        }
                        log!(format!("Signed in as {}", signed_in.username().unwrap_or_default()));
                        auth.set(signed_in);
                        login_username.set(String::new());
                        login_password.set(String::new());
                        login_open.set(false);
                        refresh.emit(());
                    }
                    Err(e) => {
                        error!(format!("Error during login: {e}"));
                        login_message.set(Some(Flash::error(session::login_message(&e))));
                    }
                }
            });
        })
    };

    let on_logout = {
        let services = services.clone();
        let auth = auth.clone();
        let menu_open = menu_open.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            let services = services.clone();
            let current = (*auth).clone();
            menu_open.set(false);
            // The page goes anonymous now; the server call finishes in the background.
            spawn_local(async move {
                if let Err(e) = session::logout(&services.backend, &services.store, &current).await {
                    warn!(format!("Logout request failed: {e}"));
                }
            });
            auth.set(Session::Anonymous);
            refresh.emit(());
        })
    };

    let on_toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    let on_open_login = {
        let menu_open = menu_open.clone();
        let login_open = login_open.clone();
        let login_message = login_message.clone();
        Callback::from(move |_: MouseEvent| {
            login_message.set(None);
            login_open.set(true);
            menu_open.set(false);
        })
    };

    let on_close_login = {
        let login_open = login_open.clone();
        Callback::from(move |_: MouseEvent| login_open.set(false))
    };

    let on_email = bind_input(email.clone());
    let on_username = bind_input(login_username.clone());
    let on_password = bind_input(login_password.clone());

    let on_activity = {
        let activity = activity.clone();
        Callback::from(move |e: Event| {
            let Some(sel) = e.target_dyn_into::<HtmlSelectElement>() else { return; };
            activity.set(sel.value());
        })
    };

    let vis = Visibility::for_session(&auth);
    let generation = match &*catalog {
        CatalogState::Loaded { generation, .. } => *generation,
        _ => 0,
    };

    html! {
        <>
          <header>
            <h1>{ "Extracurricular Activities" }</h1>
            <div class="user-menu">
              <button id="user-menu-btn" title="Teacher menu" onclick={on_toggle_menu}>{ "👤" }</button>
              <div id="admin-menu" class={classes!("admin-menu", hidden_if(!*menu_open))}>
                <p id="auth-status">{ auth.status_line() }</p>
                <button id="login-btn" class={classes!(hidden_if(!vis.login_button))} onclick={on_open_login}>
                  { "Login" }
                </button>
                <button id="logout-btn" class={classes!(hidden_if(!vis.logout_button))} onclick={on_logout}>
                  { "Logout" }
                </button>
              </div>
            </div>
          </header>

          <main>
            <section id="activities-container">
              <h3>{ "Available Activities" }</h3>
              <div id="activities-list">
                { activity_list(&catalog, vis.delete_icons, &on_unregister) }
              </div>
            </section>

            <section>
              <p id="teacher-only-notice" class={classes!(hidden_if(!vis.teacher_notice))}>
                { "Only teachers can register or unregister students. Please log in." }
              </p>

              <div id="signup-container" class={classes!(hidden_if(!vis.signup_form))}>
                <h3>{ "Sign Up a Student" }</h3>
                <form id="signup-form" onsubmit={on_signup}>
                  <div class="form-group">
                    <label for="email">{ "Student Email:" }</label>
                    <input
                      type="email"
                      id="email"
                      required=true
                      placeholder="student@school.edu"
                      value={(*email).clone()}
                      oninput={on_email}
                    />
                  </div>
                  <div class="form-group">
                    <label for="activity">{ "Select Activity:" }</label>
                    <div class="select-wrap">
                      <select key={generation.to_string()} id="activity" required=true onchange={on_activity}>
                        { activity_options(&catalog, &activity) }
                      </select>
                    </div>
                  </div>
                  <button type="submit">{ "Sign Up" }</button>
                </form>
              </div>

              { message_banner("message", message.as_ref()) }
            </section>
          </main>

          <div id="login-modal" class={classes!("modal", hidden_if(!*login_open))}>
            <div class="modal-content">
              <span id="close-login-modal" class="close" onclick={on_close_login}>{ "×" }</span>
              <h3>{ "Teacher Login" }</h3>
              <form id="login-form" onsubmit={on_login}>
                <div class="form-group">
                  <label for="teacher-username">{ "Username:" }</label>
                  <input
                    type="text"
                    id="teacher-username"
                    required=true
                    value={(*login_username).clone()}
                    oninput={on_username}
                  />
                </div>
                <div class="form-group">
                  <label for="teacher-password">{ "Password:" }</label>
                  <input
                    type="password"
                    id="teacher-password"
                    required=true
                    value={(*login_password).clone()}
                    oninput={on_password}
                  />
                </div>
                <button type="submit">{ "Login" }</button>
              </form>
              { message_banner("login-message", login_message.as_ref()) }
            </div>
          </div>
        </>
    }
}

fn hidden_if(cond: bool) -> Option<&'static str> {
    cond.then_some("hidden")
}

fn bind_input(target: UseStateHandle<String>) -> Callback<InputEvent> {
    Callback::from(move |e: InputEvent| {
        let input = e
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok());
        if let Some(i) = input {
            target.set(i.value());
        }
    })
}

fn message_banner(id: &'static str, flash: Option<&Flash>) -> Html {
    match flash {
        Some(f) => html! { <div {id} class={f.kind.class()}>{ f.text.clone() }</div> },
        None => html! { <div {id} class="hidden"></div> },
    }
}

fn activity_list(state: &CatalogState, delete_icons: bool, on_unregister: &Callback<RemoveTarget>) -> Html {
    match state {
        CatalogState::Loading => html! { <p>{ "Loading activities..." }</p> },
        CatalogState::Failed => html! { <p>{ LOAD_FAILED }</p> },
        CatalogState::Loaded { generation, catalog } => html! {
            <div class="activity-cards" key={generation.to_string()}>
              { for catalog::cards(catalog, delete_icons)
                  .into_iter()
                  .map(|card| activity_card(card, on_unregister)) }
            </div>
        },
    }
}

fn activity_card(card: ActivityCard, on_unregister: &Callback<RemoveTarget>) -> Html {
    let participants = if card.participants.is_empty() {
        html! { <p><em>{ "No participants yet" }</em></p> }
    } else {
        html! {
            <div class="participants-section">
              <h5>{ "Participants:" }</h5>
              <ul class="participants-list">
                { for card.participants.iter().map(|row| participant_row(row, on_unregister)) }
              </ul>
            </div>
        }
    };

    html! {
        <div class="activity-card">
          <h4>{ card.name.clone() }</h4>
          <p>{ card.description.clone() }</p>
          <p><strong>{ "Schedule:" }</strong>{ " " }{ card.schedule.clone() }</p>
          <p><strong>{ "Availability:" }</strong>{ " " }{ card.availability() }</p>
          <div class="participants-container">{ participants }</div>
        </div>
    }
}

fn participant_row(row: &ParticipantRow, on_unregister: &Callback<RemoveTarget>) -> Html {
    let delete = row.remove.clone().map(|target| {
        let on_unregister = on_unregister.clone();
        let onclick = Callback::from(move |_: MouseEvent| on_unregister.emit(target.clone()));
        html! { <button class="delete-btn" title="Unregister" {onclick}>{ "❌" }</button> }
    });

    html! {
        <li>
          <span class="participant-email">{ row.email.clone() }</span>
          { for delete }
        </li>
    }
}

fn activity_options(state: &CatalogState, selected: &str) -> Html {
    let names: Vec<String> = match state {
        CatalogState::Loaded { catalog, .. } => catalog.names().map(str::to_string).collect(),
        _ => vec![],
    };

    html! {
        <>
          <option value="" selected={selected.is_empty()}>{ "-- Select an activity --" }</option>
          { for names.into_iter().map(|name| {
              let is_sel = name == selected;
              html! { <option value={name.clone()} selected={is_sel}>{ name }</option> }
          }) }
        </>
    }
}
