use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rolodex_core::{ContactDraft, ContactId};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{extract::Submission, responses, AppState};

const LIST_TITLE: &str = "Contacts";
const ADD_TITLE: &str = "Add Contact";
const EDIT_TITLE: &str = "Edit Contact";
const DETAIL_TITLE: &str = "Contact Detail";

/// Edit submission: the record id, the name it had when the form was
/// opened, and the new field values.
#[derive(Debug, Deserialize, Serialize)]
pub struct ContactUpdateForm {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "oldName")]
    pub old_name: String,
    #[serde(flatten)]
    pub contact: ContactDraft,
}

#[derive(Debug, Deserialize)]
pub struct ContactDeleteForm {
    #[serde(default)]
    pub name: String,
}

/// Lists every contact and hands out the pending notice, if any.
pub async fn contact_list(State(state): State<AppState>) -> Response {
    match state.directory().list_all().await {
        Ok(contacts) => {
            let msg = state.flash().take().map(|n| n.message());
            responses::json_ok(json!({
                "title": LIST_TITLE,
                "msg": msg,
                "contacts": contacts,
            }))
        }
        Err(err) => responses::directory_error(err, LIST_TITLE, None::<&()>),
    }
}

pub async fn contact_add_form() -> impl IntoResponse {
    responses::json_ok(json!({
        "title": ADD_TITLE,
        "contact": ContactDraft::default(),
    }))
}

pub async fn contact_create(
    State(state): State<AppState>,
    Submission(draft): Submission<ContactDraft>,
) -> Response {
    match state
        .directory()
        .submit_create(draft.clone(), state.flash())
        .await
    {
        Ok(_) => responses::back_to_list(),
        Err(err) => responses::directory_error(err, ADD_TITLE, Some(&draft)),
    }
}

pub async fn contact_edit_form(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.directory().find_by_name(&name).await {
        Ok(contact) => responses::json_ok(json!({
            "title": EDIT_TITLE,
            "contact": contact,
        })),
        Err(err) => responses::directory_error(err, EDIT_TITLE, None::<&()>),
    }
}

pub async fn contact_update(
    State(state): State<AppState>,
    Submission(form): Submission<ContactUpdateForm>,
) -> Response {
    let Ok(id) = form.id.parse::<ContactId>() else {
        return responses::bad_request("invalid contact id");
    };
    match state
        .directory()
        .submit_update(id, form.contact.clone(), &form.old_name, state.flash())
        .await
    {
        Ok(_) => responses::back_to_list(),
        Err(err) => responses::directory_error(err, EDIT_TITLE, Some(&form)),
    }
}

pub async fn contact_delete(
    State(state): State<AppState>,
    Submission(form): Submission<ContactDeleteForm>,
) -> Response {
    match state
        .directory()
        .submit_delete(&form.name, state.flash())
        .await
    {
        Ok(_) => responses::back_to_list(),
        Err(err) => responses::directory_error(err, LIST_TITLE, None::<&()>),
    }
}

pub async fn contact_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.directory().find_by_name(&name).await {
        Ok(contact) => responses::json_ok(json!({
            "title": DETAIL_TITLE,
            "contact": contact,
        })),
        Err(err) => responses::directory_error(err, DETAIL_TITLE, None::<&()>),
    }
}
