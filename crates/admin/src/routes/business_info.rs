//! Business info (store details) CRUD handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use shopfloor_core::{
    BusinessInfo, BusinessInfoCounts, BusinessInfoForm, BusinessInfoId, Collection, Record,
};
use tracing::instrument;

use super::{not_found_page, render};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Business info table row.
#[derive(Debug, Clone)]
pub struct BusinessInfoRowView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub is_active: bool,
    pub updated: String,
}

impl From<&Record<BusinessInfo>> for BusinessInfoRowView {
    fn from(record: &Record<BusinessInfo>) -> Self {
        let info = &record.data;
        Self {
            id: record.id_str().to_owned(),
            name: info.name.clone(),
            category: info.category.clone(),
            address: info.full_address(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            status: info.status.clone(),
            is_active: info.is_active,
            updated: record.updated_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Business info list and create form template.
#[derive(Template)]
#[template(path = "business_info/index.html")]
pub struct BusinessInfoIndexTemplate {
    pub current_path: String,
    pub records: Vec<BusinessInfoRowView>,
    pub counts: BusinessInfoCounts,
    pub form: BusinessInfoForm,
    pub error: Option<String>,
}

/// Business info edit template.
#[derive(Template)]
#[template(path = "business_info/edit.html")]
pub struct BusinessInfoEditTemplate {
    pub current_path: String,
    pub id: String,
    pub form: BusinessInfoForm,
    pub error: Option<String>,
}

async fn index_page(
    state: &AppState,
    form: BusinessInfoForm,
    error: Option<String>,
) -> Result<Html<String>> {
    let records = state.store().list::<BusinessInfo>().await?;
    let template = BusinessInfoIndexTemplate {
        current_path: "/business-info".to_owned(),
        counts: BusinessInfoCounts::compute(records.iter().map(|r| &r.data)),
        records: records.iter().map(BusinessInfoRowView::from).collect(),
        form,
        error,
    };
    render(&template)
}

/// Business info list handler.
///
/// # Errors
///
/// Returns an error if the collection cannot be read.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let form = BusinessInfoForm {
        is_active: Some("on".to_owned()),
        ..BusinessInfoForm::default()
    };
    index_page(&state, form, None).await
}

/// Create business info handler.
///
/// # Errors
///
/// Returns an error if the record cannot be stored. Validation failures
/// re-render the page with status 422.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<BusinessInfoForm>,
) -> Result<Response> {
    match form.validate() {
        Ok(info) => {
            let record = state.store().insert(&info).await?;
            tracing::info!(business_info_id = %record.id, name = %info.name, "Business info created");
            Ok(Redirect::to("/business-info").into_response())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Business info validation failed");
            let page = index_page(&state, form, Some(e.to_string())).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Edit business info form handler.
///
/// # Errors
///
/// Returns an error if the record cannot be read.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = BusinessInfoId::new(id);
    let Some(record) = state.store().get::<BusinessInfo>(&id).await? else {
        return not_found_page("/business-info", "Business info record not found.");
    };

    let template = BusinessInfoEditTemplate {
        current_path: "/business-info".to_owned(),
        id: id.into_inner(),
        form: BusinessInfoForm::from_info(&record.data),
        error: None,
    };
    Ok(render(&template)?.into_response())
}

/// Update business info handler.
///
/// # Errors
///
/// Returns `NotFound` if the record no longer exists. Validation failures
/// re-render the form with status 422.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BusinessInfoForm>,
) -> Result<Response> {
    let id = BusinessInfoId::new(id);
    match form.validate() {
        Ok(info) => {
            state.store().replace(&id, &info).await?;
            tracing::info!(business_info_id = %id, name = %info.name, "Business info updated");
            Ok(Redirect::to("/business-info").into_response())
        }
        Err(e) => {
            tracing::debug!(business_info_id = %id, error = %e, "Business info validation failed");
            let template = BusinessInfoEditTemplate {
                current_path: "/business-info".to_owned(),
                id: id.into_inner(),
                form,
                error: Some(e.to_string()),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)?).into_response())
        }
    }
}

/// Delete business info handler.
///
/// # Errors
///
/// Returns an error if the delete fails.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    if state.store().delete(Collection::BusinessInfo, &id).await? {
        tracing::info!(business_info_id = %id, "Business info deleted");
    } else {
        tracing::warn!(business_info_id = %id, "Delete requested for missing business info");
    }
    Ok(Redirect::to("/business-info"))
}
