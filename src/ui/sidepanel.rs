/// Side panel UI for the chat-stash extension

use log::warn;
use patternfly_yew::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::detect::detect_tool;
use crate::messages::{Message, TabInfo};
use crate::store::StoreData;
use crate::tools::{ToolRegistry, UserTools};
use crate::view;

// Import JS bridge functions
#[wasm_bindgen(module = "/sidepanel.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openUrl(url: &str, new_tab: bool) -> Result<(), JsValue>;

    fn onRuntimeMessage(callback: &js_sys::Function);
}

#[derive(Clone, PartialEq)]
enum PanelState {
    Loading,
    Idle,
    Error(String),
}

#[derive(Clone, PartialEq)]
enum Modal {
    CreateGroup,
    RenameGroup { group_id: String },
    AddBookmark,
    ConfirmDeleteGroup { group_id: String, name: String },
    ConfirmDeleteBookmark { bookmark_id: String, title: String },
}

#[derive(Clone, PartialEq)]
struct Toast {
    kind: AlertType,
    text: String,
}

#[function_component(SidePanel)]
pub fn side_panel() -> Html {
    let state = use_state(|| PanelState::Loading);
    let store = use_state(StoreData::new);
    let registry = use_state(ToolRegistry::builtin);
    let modal = use_state(|| None::<Modal>);
    let toast = use_state(|| None::<Toast>);
    let name_input = use_state(String::new);
    let bookmark_title = use_state(String::new);
    let bookmark_url = use_state(String::new);
    let bookmark_group = use_state(String::new);

    // Load storage on mount and subscribe to background broadcasts
    {
        let state = state.clone();
        let store = store.clone();
        let registry = registry.clone();
        use_effect_with((), move |_| {
            {
                let state = state.clone();
                let store = store.clone();
                let registry = registry.clone();
                spawn_local(async move {
                    match load_registry().await {
                        Ok(loaded) => registry.set(loaded),
                        Err(e) => warn!("failed to load user tools: {}", e),
                    }
                    match load_store().await {
                        Ok(data) => {
                            store.set(data);
                            state.set(PanelState::Idle);
                        }
                        Err(e) => {
                            state.set(PanelState::Error(format!("Failed to load bookmarks: {}", e)));
                        }
                    }
                });
            }

            let store = store.clone();
            let callback = Closure::wrap(Box::new(move |message: JsValue| {
                if let Ok(message) = serde_wasm_bindgen::from_value::<Message>(message) {
                    match message {
                        Message::ToolDetected { .. } | Message::StorageChanged { .. } => {
                            // The background already persisted; re-read rather
                            // than trust this closure's stale copy
                            let store = store.clone();
                            spawn_local(async move {
                                match load_store().await {
                                    Ok(data) => store.set(data),
                                    Err(e) => warn!("failed to reload bookmarks: {}", e),
                                }
                            });
                        }
                        _ => {}
                    }
                }
            }) as Box<dyn Fn(JsValue)>);
            onRuntimeMessage(callback.as_ref().unchecked_ref());
            callback.forget();

            || ()
        });
    }

    // Tool selector change
    let on_tool_change = {
        let store = store.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let mut updated = (*store).clone();
                updated.set_current_tool(&select.value());
                persist(&updated);
                store.set(updated);
            }
        })
    };

    // Modal openers
    let open_create_group = {
        let modal = modal.clone();
        let name_input = name_input.clone();
        Callback::from(move |_: MouseEvent| {
            name_input.set(String::new());
            modal.set(Some(Modal::CreateGroup));
        })
    };

    let open_rename_group = {
        let modal = modal.clone();
        let name_input = name_input.clone();
        move |group_id: String, name: String| {
            let modal = modal.clone();
            let name_input = name_input.clone();
            Callback::from(move |_: MouseEvent| {
                name_input.set(name.clone());
                modal.set(Some(Modal::RenameGroup {
                    group_id: group_id.clone(),
                }));
            })
        }
    };

    let open_delete_group = {
        let modal = modal.clone();
        move |group_id: String, name: String| {
            let modal = modal.clone();
            Callback::from(move |_: MouseEvent| {
                modal.set(Some(Modal::ConfirmDeleteGroup {
                    group_id: group_id.clone(),
                    name: name.clone(),
                }));
            })
        }
    };

    let open_delete_bookmark = {
        let modal = modal.clone();
        move |bookmark_id: String, title: String| {
            let modal = modal.clone();
            Callback::from(move |_: MouseEvent| {
                modal.set(Some(Modal::ConfirmDeleteBookmark {
                    bookmark_id: bookmark_id.clone(),
                    title: title.clone(),
                }));
            })
        }
    };

    let open_add_bookmark = {
        let modal = modal.clone();
        let store = store.clone();
        let registry = registry.clone();
        let bookmark_title = bookmark_title.clone();
        let bookmark_url = bookmark_url.clone();
        let bookmark_group = bookmark_group.clone();
        Callback::from(move |_: MouseEvent| {
            let first_group = store
                .groups_for(store.current_tool())
                .next()
                .map(|g| g.id.clone())
                .unwrap_or_default();
            bookmark_group.set(first_group);
            bookmark_title.set(String::new());
            bookmark_url.set(String::new());
            modal.set(Some(Modal::AddBookmark));

            // Prefill from the active tab when it belongs to a known tool
            let registry = registry.clone();
            let bookmark_title = bookmark_title.clone();
            let bookmark_url = bookmark_url.clone();
            spawn_local(async move {
                if let Ok(Some(tab)) = active_tab().await {
                    if detect_tool(&registry, &tab.url).is_some() {
                        bookmark_title.set(tab.title);
                        bookmark_url.set(tab.url);
                    }
                }
            });
        })
    };

    let close_modal = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| modal.set(None))
    };

    // Create or rename, depending on which modal is open
    let submit_name: Callback<()> = {
        let store = store.clone();
        let modal = modal.clone();
        let name_input = name_input.clone();
        let toast = toast.clone();
        Callback::from(move |_| {
            let mut updated = (*store).clone();
            let outcome = match &*modal {
                Some(Modal::CreateGroup) => {
                    let tool_id = updated.current_tool().to_string();
                    updated
                        .create_group(&tool_id, &name_input)
                        .map(|group| format!("Group \"{}\" created", group.name))
                }
                Some(Modal::RenameGroup { group_id }) => {
                    updated.rename_group(group_id, &name_input).map(|renamed| {
                        if renamed {
                            "Group renamed".to_string()
                        } else {
                            "That group no longer exists".to_string()
                        }
                    })
                }
                _ => return,
            };

            match outcome {
                Ok(text) => {
                    persist(&updated);
                    store.set(updated);
                    modal.set(None);
                    toast.set(Some(Toast {
                        kind: AlertType::Success,
                        text,
                    }));
                }
                Err(e) => {
                    toast.set(Some(Toast {
                        kind: AlertType::Danger,
                        text: e.to_string(),
                    }));
                }
            }
        })
    };

    let on_confirm_name = {
        let submit_name = submit_name.clone();
        Callback::from(move |_: MouseEvent| submit_name.emit(()))
    };

    let on_name_keypress = {
        let submit_name = submit_name.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit_name.emit(());
            }
        })
    };

    let submit_bookmark: Callback<()> = {
        let store = store.clone();
        let modal = modal.clone();
        let toast = toast.clone();
        let bookmark_title = bookmark_title.clone();
        let bookmark_url = bookmark_url.clone();
        let bookmark_group = bookmark_group.clone();
        Callback::from(move |_| {
            let mut updated = (*store).clone();
            match updated.add_bookmark(&bookmark_group, &bookmark_title, &bookmark_url) {
                Ok(bookmark) => {
                    persist(&updated);
                    store.set(updated);
                    modal.set(None);
                    toast.set(Some(Toast {
                        kind: AlertType::Success,
                        text: format!("\"{}\" saved", bookmark.title),
                    }));
                }
                Err(e) => {
                    toast.set(Some(Toast {
                        kind: AlertType::Danger,
                        text: e.to_string(),
                    }));
                }
            }
        })
    };

    let on_confirm_bookmark = {
        let submit_bookmark = submit_bookmark.clone();
        Callback::from(move |_: MouseEvent| submit_bookmark.emit(()))
    };

    let on_confirm_delete = {
        let store = store.clone();
        let modal = modal.clone();
        let toast = toast.clone();
        Callback::from(move |_: MouseEvent| {
            let mut updated = (*store).clone();
            let text = match &*modal {
                Some(Modal::ConfirmDeleteGroup { group_id, .. }) => {
                    if updated.delete_group(group_id) {
                        "Group deleted"
                    } else {
                        "That group was already gone"
                    }
                }
                Some(Modal::ConfirmDeleteBookmark { bookmark_id, .. }) => {
                    if updated.delete_bookmark(bookmark_id) {
                        "Bookmark deleted"
                    } else {
                        "That bookmark was already gone"
                    }
                }
                _ => return,
            };
            persist(&updated);
            store.set(updated);
            modal.set(None);
            toast.set(Some(Toast {
                kind: AlertType::Success,
                text: text.to_string(),
            }));
        })
    };

    // Click opens in the current tab; ctrl/cmd-click in a new one
    let open_bookmark = {
        move |url: String| {
            Callback::from(move |e: MouseEvent| {
                let url = url.clone();
                let new_tab = e.ctrl_key() || e.meta_key();
                spawn_local(async move {
                    if let Err(err) = openUrl(&url, new_tab).await {
                        warn!("failed to open bookmark: {:?}", err);
                    }
                });
            })
        }
    };

    // Input bindings
    let on_name_input = {
        let name_input = name_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                name_input.set(input.value());
            }
        })
    };

    let on_bookmark_title_input = {
        let bookmark_title = bookmark_title.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                bookmark_title.set(input.value());
            }
        })
    };

    let on_bookmark_url_input = {
        let bookmark_url = bookmark_url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                bookmark_url.set(input.value());
            }
        })
    };

    let on_bookmark_group_change = {
        let bookmark_group = bookmark_group.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                bookmark_group.set(select.value());
            }
        })
    };

    let panel = view::project(&store, &registry);

    html! {
        <div class="panel">
            <header class="panel-header">
                <h1 class="panel-title">{"Chat Stash"}</h1>
                <select class="tool-select" onchange={on_tool_change}>
                    { for panel.tools.iter().map(|tool| html! {
                        <option value={tool.id.clone()} selected={tool.selected}>
                            {&tool.label}
                        </option>
                    })}
                </select>
            </header>

            if let Some(current) = &*toast {
                <Alert r#type={current.kind.clone()} title={current.text.clone()} inline={true}>
                </Alert>
            }

            <div class="panel-actions">
                <Button onclick={open_create_group} variant={ButtonVariant::Secondary} block={true}>
                    {"➕ New Group"}
                </Button>
                <Button onclick={open_add_bookmark} variant={ButtonVariant::Secondary} block={true} disabled={panel.is_empty}>
                    {"🔖 Save Bookmark"}
                </Button>
            </div>

            {match &*state {
                PanelState::Loading => html! {
                    <div class="panel-loading">
                        <Spinner />
                    </div>
                },
                PanelState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PanelState::Idle => html! {},
            }}

            if panel.is_empty {
                <p class="empty-state">
                    {"No groups for this tool yet. Create one to start saving conversations."}
                </p>
            } else {
                <div class="groups-list">
                    { for panel.groups.iter().map(|group| {
                        let rename = open_rename_group(group.id.clone(), group.name.clone());
                        let remove = open_delete_group(group.id.clone(), group.name.clone());
                        html! {
                            <div class="group-item" key={group.id.clone()}>
                                <div class="group-header">
                                    <span class="group-name">{&group.name}</span>
                                    <span class="group-count">{group.bookmark_count}</span>
                                    <button class="icon-button" title="Rename group" onclick={rename}>{"✏️"}</button>
                                    <button class="icon-button" title="Delete group" onclick={remove}>{"🗑️"}</button>
                                </div>
                                <div class="bookmarks-list">
                                    { for group.bookmarks.iter().map(|bookmark| {
                                        let open = open_bookmark(bookmark.url.clone());
                                        let remove = open_delete_bookmark(bookmark.id.clone(), bookmark.title.clone());
                                        html! {
                                            <div class="bookmark-item" key={bookmark.id.clone()}>
                                                <span class="bookmark-icon">{"🔗"}</span>
                                                <a class="bookmark-title" title={bookmark.url.clone()} onclick={open}>
                                                    {&bookmark.title}
                                                </a>
                                                <button class="icon-button" title="Delete bookmark" onclick={remove}>{"✖"}</button>
                                            </div>
                                        }
                                    })}
                                </div>
                            </div>
                        }
                    })}
                </div>
            }

            {match &*modal {
                Some(Modal::CreateGroup) | Some(Modal::RenameGroup { .. }) => {
                    let heading = if matches!(&*modal, Some(Modal::CreateGroup)) {
                        "New Group"
                    } else {
                        "Rename Group"
                    };
                    html! {
                        <div class="modal-backdrop">
                            <div class="modal-box">
                                <h2 class="modal-title">{heading}</h2>
                                <input
                                    class="modal-input"
                                    placeholder="Group name"
                                    value={(*name_input).clone()}
                                    oninput={on_name_input.clone()}
                                    onkeypress={on_name_keypress.clone()}
                                />
                                <div class="modal-actions">
                                    <Button onclick={close_modal.clone()} variant={ButtonVariant::Secondary}>
                                        {"Cancel"}
                                    </Button>
                                    <Button onclick={on_confirm_name.clone()} variant={ButtonVariant::Primary}>
                                        {"Save"}
                                    </Button>
                                </div>
                            </div>
                        </div>
                    }
                }
                Some(Modal::AddBookmark) => html! {
                    <div class="modal-backdrop">
                        <div class="modal-box">
                            <h2 class="modal-title">{"Save Bookmark"}</h2>
                            <input
                                class="modal-input"
                                placeholder="Title"
                                value={(*bookmark_title).clone()}
                                oninput={on_bookmark_title_input.clone()}
                            />
                            <input
                                class="modal-input"
                                placeholder="https://"
                                value={(*bookmark_url).clone()}
                                oninput={on_bookmark_url_input.clone()}
                            />
                            <select class="modal-select" onchange={on_bookmark_group_change.clone()}>
                                { for panel.groups.iter().map(|group| html! {
                                    <option
                                        value={group.id.clone()}
                                        selected={group.id == *bookmark_group}
                                    >
                                        {&group.name}
                                    </option>
                                })}
                            </select>
                            <div class="modal-actions">
                                <Button onclick={close_modal.clone()} variant={ButtonVariant::Secondary}>
                                    {"Cancel"}
                                </Button>
                                <Button onclick={on_confirm_bookmark.clone()} variant={ButtonVariant::Primary}>
                                    {"Save"}
                                </Button>
                            </div>
                        </div>
                    </div>
                },
                Some(Modal::ConfirmDeleteGroup { name, .. }) => html! {
                    <div class="modal-backdrop">
                        <div class="modal-box">
                            <h2 class="modal-title">{"Delete Group"}</h2>
                            <p class="modal-text">
                                {format!("Delete \"{}\" and all of its bookmarks? This cannot be undone.", name)}
                            </p>
                            <div class="modal-actions">
                                <Button onclick={close_modal.clone()} variant={ButtonVariant::Secondary}>
                                    {"Cancel"}
                                </Button>
                                <Button onclick={on_confirm_delete.clone()} variant={ButtonVariant::Danger}>
                                    {"Delete"}
                                </Button>
                            </div>
                        </div>
                    </div>
                },
                Some(Modal::ConfirmDeleteBookmark { title, .. }) => html! {
                    <div class="modal-backdrop">
                        <div class="modal-box">
                            <h2 class="modal-title">{"Delete Bookmark"}</h2>
                            <p class="modal-text">
                                {format!("Delete \"{}\"? This cannot be undone.", title)}
                            </p>
                            <div class="modal-actions">
                                <Button onclick={close_modal.clone()} variant={ButtonVariant::Secondary}>
                                    {"Cancel"}
                                </Button>
                                <Button onclick={on_confirm_delete.clone()} variant={ButtonVariant::Danger}>
                                    {"Delete"}
                                </Button>
                            </div>
                        </div>
                    </div>
                },
                None => html! {},
            }}

            <p class="panel-footer">{"Chat Stash v0.1.0"}</p>
        </div>
    }
}

// Helper functions

fn persist(store: &StoreData) {
    let snapshot = store.clone();
    spawn_local(async move {
        // In-memory state stays authoritative; a failed write only costs
        // durability until the next successful one
        if let Err(e) = save_store(&snapshot).await {
            warn!("failed to persist bookmarks: {}", e);
        }
    });
}

async fn load_store() -> Result<StoreData, String> {
    let js = getStorage(crate::STORE_KEY)
        .await
        .map_err(|e| format!("{:?}", e))?;
    if js.is_null() || js.is_undefined() {
        return Ok(StoreData::new());
    }
    let mut store: StoreData = serde_wasm_bindgen::from_value(js).map_err(|e| e.to_string())?;
    store.repair();
    Ok(store)
}

async fn save_store(store: &StoreData) -> Result<(), String> {
    let js = serde_wasm_bindgen::to_value(store).map_err(|e| e.to_string())?;
    setStorage(crate::STORE_KEY, js)
        .await
        .map_err(|e| format!("{:?}", e))
}

async fn load_registry() -> Result<ToolRegistry, String> {
    let js = getStorage(crate::TOOLS_KEY)
        .await
        .map_err(|e| format!("{:?}", e))?;
    if js.is_null() || js.is_undefined() {
        return Ok(ToolRegistry::builtin());
    }
    let user: UserTools = serde_wasm_bindgen::from_value(js).map_err(|e| e.to_string())?;
    Ok(ToolRegistry::with_user_tools(&user))
}

async fn active_tab() -> Result<Option<TabInfo>, String> {
    let js = getActiveTab().await.map_err(|e| format!("{:?}", e))?;
    if js.is_null() || js.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(js)
        .map(Some)
        .map_err(|e| e.to_string())
}
