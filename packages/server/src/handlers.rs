//! HTTP handler functions for the nephro coach API.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use nephro_coach_database::{Collection, queries};
use nephro_coach_report_models::{BmiRecord, CREATININE_KEY, PatientRecord, StoredRecord};
use nephro_coach_server_models::{
    ApiBmiRecord, ApiHealth, ApiLatestAge, ApiLatestCreatinine, ApiPatientRecord,
    ApiPatientSummary, ApiSaveBmi, BMI_SAVED_MESSAGE, NO_AGE_RECORD_MESSAGE, NO_BMI_RECORD_MESSAGE,
    NO_CREATININE_MESSAGE, NO_LATEST_PATIENT_MESSAGE, NO_PATIENT_HISTORY_MESSAGE, SaveBmiRequest,
};

use crate::AppState;
use crate::error::ServiceError;
use crate::upload;

/// Multipart field carrying the lab report.
const FILE_FIELD: &str = "file";

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /save-bmi`
///
/// Validates and stores one BMI calculation.
pub async fn save_bmi(
    state: web::Data<AppState>,
    body: web::Json<SaveBmiRequest>,
) -> Result<HttpResponse, ServiceError> {
    let record = body.into_inner().into_record()?;
    let id = queries::insert(state.db.as_ref(), Collection::BmiRecords, &record).await?;

    log::info!("Saved BMI record {id}");

    Ok(HttpResponse::Created().json(ApiSaveBmi {
        message: BMI_SAVED_MESSAGE.to_string(),
        id: id.to_string(),
    }))
}

/// `GET /get-bmi-records`
pub async fn get_bmi_records(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let records: Vec<StoredRecord<BmiRecord>> =
        queries::find_all(state.db.as_ref(), Collection::BmiRecords).await?;

    let body: Vec<ApiBmiRecord> = records.into_iter().map(ApiBmiRecord::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// `GET /latest-bmi`
pub async fn latest_bmi(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let latest = latest_bmi_record(&state)
        .await?
        .ok_or(ServiceError::NotFound(NO_BMI_RECORD_MESSAGE))?;

    Ok(HttpResponse::Ok().json(ApiBmiRecord::from(latest)))
}

/// `GET /latest-age`
///
/// Returns the age from the most recent BMI record.
pub async fn latest_age(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let age = latest_bmi_record(&state)
        .await?
        .map(|stored| stored.record.age)
        .filter(|age| !age.is_null())
        .ok_or(ServiceError::NotFound(NO_AGE_RECORD_MESSAGE))?;

    Ok(HttpResponse::Ok().json(ApiLatestAge { age }))
}

/// `GET /latest-creatinine`
///
/// Returns the `Creatinine` result of the most recent patient record.
pub async fn latest_creatinine(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let creatinine = latest_patient_record(&state)
        .await?
        .and_then(|stored| stored.record.get(CREATININE_KEY).cloned())
        .ok_or(ServiceError::CreatinineNotFound(NO_CREATININE_MESSAGE))?;

    Ok(HttpResponse::Ok().json(ApiLatestCreatinine { creatinine }))
}

/// `POST /process-pdf`
///
/// Saves the uploaded lab report, extracts a patient record from it and
/// stores the record.
pub async fn process_pdf(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let file = upload::read_file_field(payload, FILE_FIELD).await?;
    let path = upload::save_upload(&state.upload_dir, &file.filename, &file.bytes).await?;

    log::info!("Processing lab report {}", path.display());

    let record = web::block(move || nephro_coach_pdf::process_report_file(&path))
        .await
        .map_err(|e| ServiceError::Blocking(e.to_string()))??;

    let id = queries::insert(state.db.as_ref(), Collection::PatientRecords, &record).await?;

    log::info!(
        "Stored patient record {id} from '{}' ({} fields)",
        file.filename,
        record.len()
    );

    Ok(HttpResponse::Ok().json(ApiPatientRecord::from(StoredRecord { id, record })))
}

/// `GET /patient-history`
///
/// Returns a summary of every patient record, most recent first.
pub async fn patient_history(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let records: Vec<StoredRecord<PatientRecord>> =
        queries::find_all(state.db.as_ref(), Collection::PatientRecords).await?;

    if records.is_empty() {
        return Err(ServiceError::NotFound(NO_PATIENT_HISTORY_MESSAGE));
    }

    let history: Vec<ApiPatientSummary> = records
        .iter()
        .rev()
        .map(|stored| ApiPatientSummary::from(&stored.record))
        .collect();

    Ok(HttpResponse::Ok().json(history))
}

/// `GET /latest-patient`
pub async fn latest_patient(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let latest = latest_patient_record(&state)
        .await?
        .ok_or(ServiceError::NotFound(NO_LATEST_PATIENT_MESSAGE))?;

    Ok(HttpResponse::Ok().json(ApiPatientSummary::from(&latest.record)))
}

async fn latest_bmi_record(state: &AppState) -> Result<Option<StoredRecord<BmiRecord>>, ServiceError> {
    Ok(queries::find_latest(state.db.as_ref(), Collection::BmiRecords).await?)
}

async fn latest_patient_record(
    state: &AppState,
) -> Result<Option<StoredRecord<PatientRecord>>, ServiceError> {
    Ok(queries::find_latest(state.db.as_ref(), Collection::PatientRecords).await?)
}
