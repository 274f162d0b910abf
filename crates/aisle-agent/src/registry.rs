//! Declarative function specs for the AI assistant, plus the
//! dispatcher that executes a named call through the secure facades.
//!
//! The assistant never touches storage directly: every call derives a
//! [`SecurityContext`] from the session and goes through the same
//! gated repositories as the HTTP layer.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};
use tracing::debug;

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::guest::{Attendance, CreateGuest, Guest, GuestWithWedding};
use aisle_core::models::session::Session;
use aisle_core::models::tenant::Tenant;
use aisle_core::repository::{GuestRepository, TenantRepository};
use aisle_core::security::SecurityContext;
use aisle_secure::guests::{GuestScope, SecureGuestRepository};
use aisle_secure::tenants::SecureTenantRepository;

/// One callable function as advertised to the model: name, human
/// description, a JSON-schema parameter object, and the required keys.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
    pub required: &'static [&'static str],
}

/// The full function table, in the order it is advertised.
pub fn function_specs() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec {
            name: "get_rsvp_summary",
            description: "Get RSVP counts (attending, not attending, maybe) for one wedding.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "tenant_id": { "type": "integer", "description": "Wedding id" }
                }
            }),
            required: &["tenant_id"],
        },
        FunctionSpec {
            name: "search_guests",
            description: "Search guests by name or relationship. Without tenant_id the \
                          search spans every active wedding.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search text" },
                    "tenant_id": { "type": "integer", "description": "Restrict to one wedding" }
                }
            }),
            required: &["query"],
        },
        FunctionSpec {
            name: "update_guest_status",
            description: "Set a guest's attendance to yes, no or maybe.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "guest_id": { "type": "integer" },
                    "status": { "type": "string", "enum": ["yes", "no", "maybe"] },
                    "tenant_id": { "type": "integer", "description": "Owning wedding id" }
                }
            }),
            required: &["guest_id", "status"],
        },
        FunctionSpec {
            name: "add_guest",
            description: "Add a guest to a wedding.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "tenant_id": { "type": "integer" },
                    "name": { "type": "string" },
                    "relationship": { "type": "string", "description": "e.g. Friend, Aunt" },
                    "attendance": { "type": "string", "enum": ["yes", "no", "maybe"] },
                    "message": { "type": "string" }
                }
            }),
            required: &["tenant_id", "name", "relationship", "attendance"],
        },
        FunctionSpec {
            name: "get_tenant_by_id",
            description: "Look up one wedding by numeric id.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "tenant_id": { "type": "integer" }
                }
            }),
            required: &["tenant_id"],
        },
        FunctionSpec {
            name: "get_tenant_by_slug",
            description: "Look up one wedding by its URL slug.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "slug": { "type": "string" }
                }
            }),
            required: &["slug"],
        },
        FunctionSpec {
            name: "search_tenants",
            description: "List weddings, optionally filtered by couple name, active \
                          status or wedding date range.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "search": { "type": "string" },
                    "is_active": { "type": "boolean" },
                    "wedding_date_from": { "type": "string", "format": "date" },
                    "wedding_date_to": { "type": "string", "format": "date" },
                    "page": { "type": "integer" },
                    "limit": { "type": "integer" }
                }
            }),
            required: &[],
        },
        FunctionSpec {
            name: "export_guest_list",
            description: "Export a wedding's full guest list as an Excel workbook.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "tenant_id": { "type": "integer" }
                }
            }),
            required: &["tenant_id"],
        },
    ]
}

fn args_object(args: &Value) -> PanelResult<&Map<String, Value>> {
    args.as_object()
        .ok_or_else(|| PanelError::validation("function arguments must be a JSON object"))
}

fn require_i64(args: &Map<String, Value>, key: &str) -> PanelResult<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| PanelError::validation(format!("{key} must be an integer")))
}

fn require_str<'a>(args: &'a Map<String, Value>, key: &str) -> PanelResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PanelError::validation(format!("{key} must be a string")))
}

fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// `tenant_id` present scopes to that wedding; absent is the explicit
/// cross-wedding path. A present but malformed tenant id is rejected —
/// it must never degrade into the unscoped variant.
fn scope_from(args: &Map<String, Value>) -> PanelResult<GuestScope> {
    match args.get("tenant_id") {
        None => Ok(GuestScope::AllTenants),
        Some(value) => match value.as_i64() {
            Some(id) if id > 0 => Ok(GuestScope::Tenant(id)),
            _ => Err(PanelError::validation(
                "tenant_id must be a positive integer",
            )),
        },
    }
}

fn tenant_json(tenant: &Tenant) -> Value {
    json!({
        "id": tenant.id,
        "slug": tenant.slug,
        "brideName": tenant.bride_name,
        "groomName": tenant.groom_name,
        "weddingDate": tenant.wedding_date.to_rfc3339(),
        "venueName": tenant.venue_name,
        "venueAddress": tenant.venue_address,
        "isActive": tenant.is_active,
    })
}

fn guest_json(guest: &Guest) -> Value {
    json!({
        "id": guest.id,
        "tenantId": guest.tenant_id,
        "name": guest.name,
        "relationship": guest.relationship,
        "attendance": guest.attendance.as_str(),
        "message": guest.message,
    })
}

fn guest_with_wedding_json(row: &GuestWithWedding) -> Value {
    let mut value = guest_json(&row.guest);
    if let Some(map) = value.as_object_mut() {
        map.insert("brideName".into(), json!(row.bride_name));
        map.insert("groomName".into(), json!(row.groom_name));
        map.insert("weddingDate".into(), json!(row.wedding_date.to_rfc3339()));
    }
    value
}

/// Executes assistant function calls against the secure facades.
pub struct AgentToolbox<T: TenantRepository, G: GuestRepository> {
    tenants: SecureTenantRepository<T>,
    guests: SecureGuestRepository<G>,
}

impl<T: TenantRepository, G: GuestRepository> AgentToolbox<T, G> {
    pub fn new(tenants: SecureTenantRepository<T>, guests: SecureGuestRepository<G>) -> Self {
        Self { tenants, guests }
    }

    /// Dispatch one named call. Unknown names and malformed argument
    /// objects are validation errors; everything downstream carries
    /// the secure layer's own error taxonomy.
    pub async fn dispatch(
        &self,
        session: Option<&Session>,
        name: &str,
        args: &Value,
    ) -> PanelResult<Value> {
        let ctx = SecurityContext::from_session(session);
        let args = args_object(args)?;
        debug!(function = name, "agent function call");

        match name {
            "get_rsvp_summary" => self.rsvp_summary(&ctx, args).await,
            "search_guests" => self.search_guests(&ctx, args).await,
            "update_guest_status" => self.update_guest_status(&ctx, args).await,
            "add_guest" => self.add_guest(&ctx, args).await,
            "get_tenant_by_id" => self.tenant_by_id(&ctx, args).await,
            "get_tenant_by_slug" => self.tenant_by_slug(&ctx, args).await,
            "search_tenants" => self.search_tenants(&ctx, args).await,
            "export_guest_list" => self.export_guest_list(&ctx, args).await,
            other => Err(PanelError::validation(format!("unknown function '{other}'"))),
        }
    }

    async fn rsvp_summary(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let tenant_id = require_i64(args, "tenant_id")?;
        let stats = self.guests.guest_stats(ctx, tenant_id).await?;
        Ok(json!({
            "tenantId": tenant_id,
            "total": stats.total,
            "attending": stats.attending,
            "notAttending": stats.not_attending,
            "maybe": stats.maybe,
        }))
    }

    async fn search_guests(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let query = require_str(args, "query")?;
        let scope = scope_from(args)?;
        let rows = self.guests.search_guests(ctx, query, scope).await?;
        Ok(json!({
            "count": rows.len(),
            "guests": rows.iter().map(guest_with_wedding_json).collect::<Vec<_>>(),
        }))
    }

    async fn update_guest_status(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let guest_id = require_i64(args, "guest_id")?;
        let status = require_str(args, "status")?;
        let scope = scope_from(args)?;
        let guest = self
            .guests
            .update_guest_status(ctx, guest_id, status, scope)
            .await?;
        Ok(guest_json(&guest))
    }

    async fn add_guest(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let input = CreateGuest {
            tenant_id: require_i64(args, "tenant_id")?,
            name: require_str(args, "name")?.to_string(),
            relationship: require_str(args, "relationship")?.to_string(),
            attendance: Attendance::parse(require_str(args, "attendance")?)?,
            message: optional_str(args, "message").map(str::to_string),
        };
        let guest = self.guests.create(ctx, input).await?;
        Ok(guest_json(&guest))
    }

    async fn tenant_by_id(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let tenant_id = require_i64(args, "tenant_id")?;
        let tenant = self.tenants.find_by_id(ctx, tenant_id).await?;
        Ok(tenant_json(&tenant))
    }

    async fn tenant_by_slug(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let slug = require_str(args, "slug")?;
        let tenant = self.tenants.find_by_slug(ctx, slug).await?;
        Ok(tenant_json(&tenant))
    }

    async fn search_tenants(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let page = self.tenants.find_many(ctx, args).await?;
        Ok(json!({
            "total": page.total,
            "tenants": page.items.iter().map(tenant_json).collect::<Vec<_>>(),
        }))
    }

    async fn export_guest_list(
        &self,
        ctx: &SecurityContext,
        args: &Map<String, Value>,
    ) -> PanelResult<Value> {
        let tenant_id = require_i64(args, "tenant_id")?;
        let file =
            aisle_transfer::export_guests(&self.tenants, &self.guests, ctx, tenant_id).await?;
        Ok(json!({
            "filename": file.filename,
            "sizeBytes": file.bytes.len(),
            "contentBase64": BASE64.encode(&file.bytes),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_advertises_every_function_once() {
        let specs = function_specs();
        let names: Vec<&str> = specs.iter().map(|s| s.name).collect();
        let expected = [
            "get_rsvp_summary",
            "search_guests",
            "update_guest_status",
            "add_guest",
            "get_tenant_by_id",
            "get_tenant_by_slug",
            "search_tenants",
            "export_guest_list",
        ];
        assert_eq!(names, expected);
    }

    #[test]
    fn required_keys_exist_in_their_schemas() {
        for spec in function_specs() {
            let properties = spec.parameters["properties"]
                .as_object()
                .unwrap_or_else(|| panic!("{} has no properties object", spec.name));
            for key in spec.required {
                assert!(
                    properties.contains_key(*key),
                    "{}: required key {key} missing from schema",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn scope_defaults_to_all_tenants_only_when_absent() {
        let mut args = Map::new();
        assert_eq!(scope_from(&args).unwrap(), GuestScope::AllTenants);
        args.insert("tenant_id".into(), json!(7));
        assert_eq!(scope_from(&args).unwrap(), GuestScope::Tenant(7));
    }

    #[test]
    fn malformed_tenant_id_never_widens_scope() {
        for bad in [json!("42"), json!(0), json!(-3), json!(1.5), json!(null)] {
            let mut args = Map::new();
            args.insert("tenant_id".into(), bad);
            let err = scope_from(&args).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }
    }

    #[test]
    fn missing_argument_is_a_validation_error() {
        let args = Map::new();
        assert_eq!(require_i64(&args, "tenant_id").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(require_str(&args, "query").unwrap_err().code(), "VALIDATION_ERROR");
    }
}
