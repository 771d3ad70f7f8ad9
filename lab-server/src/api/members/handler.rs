//! Member API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::{
    CareerEntry, ConflictReport, EducationEntry, MemberId, MemberIdentity, MemberRecord,
    MemberStatus, RosterRow, SocialLink, TypeDetails,
};

use crate::core::ServerState;
use crate::registry::{MemberPatch, NewAward, NewDocument, NewMember, RosterFilter};
use crate::services::UploadedAsset;
use crate::utils::{AppError, AppResult};

// ── 请求体 ──────────────────────────────────────────────────────────

/// Uploaded file, base64 encoded in the JSON body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpload {
    pub file_name: String,
    pub data_base64: String,
}

impl AssetUpload {
    fn decode(self, field: &str) -> AppResult<UploadedAsset> {
        let bytes = STANDARD.decode(self.data_base64.as_bytes()).map_err(|e| {
            AppError::invalid_request(format!("{field}: invalid base64: {e}"))
                .with_detail("field", field)
        })?;
        Ok(UploadedAsset::new(self.file_name, bytes))
    }
}

fn decode_optional(asset: Option<AssetUpload>, field: &str) -> AppResult<Option<UploadedAsset>> {
    asset.map(|a| a.decode(field)).transpose()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardUpload {
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub photo: Option<AssetUpload>,
}

impl AwardUpload {
    fn into_input(self) -> AppResult<NewAward> {
        Ok(NewAward {
            title: self.title,
            year: self.year,
            details: self.details,
            photo: decode_optional(self.photo, "awards.photo")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub title: String,
    pub document_type: String,
    pub file: AssetUpload,
}

impl DocumentUpload {
    fn into_input(self) -> AppResult<NewDocument> {
        Ok(NewDocument {
            title: self.title,
            document_type: self.document_type,
            file: self.file.decode("documents.file")?,
        })
    }
}

/// POST /api/members body; `details.member_type` selects the type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub primary_email: String,
    #[serde(default)]
    pub other_emails: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    pub password: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub status: Option<MemberStatus>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub details: TypeDetails,
    #[serde(default)]
    pub photo: Option<AssetUpload>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub career: Vec<CareerEntry>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub awards: Vec<AwardUpload>,
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

impl CreateMemberRequest {
    fn into_input(self) -> AppResult<NewMember> {
        Ok(NewMember {
            first_name: self.first_name,
            last_name: self.last_name,
            primary_email: self.primary_email,
            other_emails: self.other_emails,
            phone: self.phone,
            id_number: self.id_number,
            passport_number: self.passport_number,
            password: self.password,
            date_of_birth: self.date_of_birth,
            biography: self.biography,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            details: self.details,
            photo: decode_optional(self.photo, "photo")?,
            education: self.education,
            career: self.career,
            social_links: self.social_links,
            awards: self
                .awards
                .into_iter()
                .map(AwardUpload::into_input)
                .collect::<AppResult<_>>()?,
            documents: self
                .documents
                .into_iter()
                .map(DocumentUpload::into_input)
                .collect::<AppResult<_>>()?,
        })
    }
}

/// PUT /api/members/{id} body; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub other_emails: Option<Vec<String>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub status: Option<MemberStatus>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub details: Option<TypeDetails>,
    #[serde(default)]
    pub photo: Option<AssetUpload>,
    #[serde(default)]
    pub education: Option<Vec<EducationEntry>>,
    #[serde(default)]
    pub career: Option<Vec<CareerEntry>>,
    #[serde(default)]
    pub social_links: Option<Vec<SocialLink>>,
    #[serde(default)]
    pub new_awards: Vec<AwardUpload>,
    #[serde(default)]
    pub new_documents: Vec<DocumentUpload>,
    #[serde(default)]
    pub remove_documents: Vec<i64>,
}

impl UpdateMemberRequest {
    fn into_patch(self) -> AppResult<MemberPatch> {
        Ok(MemberPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            other_emails: self.other_emails,
            phone: self.phone,
            id_number: self.id_number,
            passport_number: self.passport_number,
            password: self.password,
            biography: self.biography,
            status: self.status,
            end_date: self.end_date,
            details: self.details,
            photo: decode_optional(self.photo, "photo")?,
            education: self.education,
            career: self.career,
            social_links: self.social_links,
            new_awards: self
                .new_awards
                .into_iter()
                .map(AwardUpload::into_input)
                .collect::<AppResult<_>>()?,
            new_documents: self
                .new_documents
                .into_iter()
                .map(DocumentUpload::into_input)
                .collect::<AppResult<_>>()?,
            remove_documents: self.remove_documents,
        })
    }
}

/// POST /api/members/conflicts body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    #[serde(flatten)]
    pub identity: MemberIdentity,
    /// Member being edited, ignored by the check
    #[serde(default)]
    pub exclude_id: Option<MemberId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedMember {
    pub id: MemberId,
}

fn parse_id(raw: &str) -> AppResult<MemberId> {
    raw.parse().map_err(|e| {
        AppError::invalid_request(format!("invalid member id '{raw}': {e}"))
            .with_detail("field", "id")
    })
}

// ── 处理函数 ────────────────────────────────────────────────────────

/// GET /api/members - 获取会员名册（可按类型、状态过滤）
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<RosterFilter>,
) -> AppResult<Json<Vec<RosterRow>>> {
    let rows = state.registry.list_roster(filter).await?;
    Ok(Json(rows))
}

/// POST /api/members - 登记新成员
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateMemberRequest>,
) -> AppResult<Json<CreatedMember>> {
    let id = state.registry.create_member(payload.into_input()?).await?;
    Ok(Json(CreatedMember { id }))
}

/// GET /api/members/{id} - 获取单个成员（名册行 + 完整档案）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MemberRecord>> {
    let record = state.registry.get_member(parse_id(&id)?).await?;
    Ok(Json(record))
}

/// PUT /api/members/{id} - 更新成员（未提供的字段保持不变）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> AppResult<Json<MemberRecord>> {
    let id = parse_id(&id)?;
    state.registry.update_member(id, payload.into_patch()?).await?;
    let record = state.registry.get_member(id).await?;
    Ok(Json(record))
}

/// DELETE /api/members/{id}/documents/{document_id} - 删除文档
pub async fn delete_document(
    State(state): State<ServerState>,
    Path((id, document_id)): Path<(String, i64)>,
) -> AppResult<Json<bool>> {
    state
        .registry
        .delete_document(parse_id(&id)?, document_id)
        .await?;
    Ok(Json(true))
}

/// POST /api/members/conflicts - 检查身份冲突，返回全部冲突维度
pub async fn conflicts(
    State(state): State<ServerState>,
    Json(payload): Json<ConflictCheckRequest>,
) -> AppResult<Json<ConflictReport>> {
    let report = state
        .registry
        .check_conflicts(&payload.identity, payload.exclude_id)
        .await?;
    Ok(Json(report))
}
