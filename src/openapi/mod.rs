use crate::handlers;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "1.0.0",
        description = r#"
# Garment workshop back office

Clients and their models, import/export declarations, deliveries, cutting and sewing
sheets, invoices, and the reconciliation of ordered, received and delivered quantities.

## Authentication

Every `/api` endpoint expects a bearer token issued by the identity provider:

```
Authorization: Bearer <your-jwt-token>
```

The `role` claim (ADMIN, COUPEUR, CHEF, USER) decides which write endpoints are open.
Invoices and the dashboard are reserved to ADMIN.

## Pagination

List endpoints accept `page` (default 1) and `limit` (default and maximum come from
configuration).
        "#
    ),
    modifiers(&BearerAuth),
    security(("bearer_auth" = [])),
    tags(
        (name = "clients", description = "Clients and their submission windows"),
        (name = "client-models", description = "Models, orders and variants"),
        (name = "inbound", description = "Import declarations and inbound deliveries"),
        (name = "outbound", description = "Export declarations and outbound deliveries"),
        (name = "invoices", description = "Invoices"),
        (name = "production", description = "Cutting sheets, sewing sheets and follow-up"),
        (name = "staff", description = "Employees and production time"),
        (name = "calendar", description = "Calendar events"),
        (name = "reports", description = "Dashboard, planning and état reports"),
        (name = "sync", description = "Replay of operations queued offline")
    ),
    paths(
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::expiring_clients,
        handlers::clients::sync_clients,

        handlers::client_models::list_client_models,
        handlers::client_models::get_client_model,
        handlers::client_models::create_client_model,
        handlers::client_models::update_client_model,
        handlers::client_models::delete_client_model,
        handlers::client_models::client_model_reconciliation,

        handlers::inbound::list_imports,
        handlers::inbound::get_import,
        handlers::inbound::create_import,
        handlers::inbound::update_import,
        handlers::inbound::delete_import,
        handlers::inbound::list_livraisons_entree,
        handlers::inbound::get_livraison_entree,
        handlers::inbound::create_livraison_entree,
        handlers::inbound::update_livraison_entree,
        handlers::inbound::delete_livraison_entree,

        handlers::outbound::list_exports,
        handlers::outbound::get_export,
        handlers::outbound::create_export,
        handlers::outbound::update_export,
        handlers::outbound::delete_export,
        handlers::outbound::list_livraisons,
        handlers::outbound::get_livraison,
        handlers::outbound::create_livraison,
        handlers::outbound::update_livraison,
        handlers::outbound::delete_livraison,

        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::create_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::update_invoice_status,
        handlers::invoices::delete_invoice,

        handlers::production::list_fiches_coupe,
        handlers::production::get_fiche_coupe,
        handlers::production::create_fiche_coupe,
        handlers::production::update_fiche_coupe,
        handlers::production::delete_fiche_coupe,
        handlers::production::sync_fiches_coupe,
        handlers::production::list_fiches_production,
        handlers::production::get_fiche_production,
        handlers::production::create_fiche_production,
        handlers::production::update_fiche_production,
        handlers::production::delete_fiche_production,
        handlers::production::sync_fiches_production,
        handlers::production::list_suivis_production,
        handlers::production::get_suivi_production,
        handlers::production::create_suivi_production,
        handlers::production::update_suivi_production,
        handlers::production::delete_suivi_production,

        handlers::staff::list_employees,
        handlers::staff::get_employee,
        handlers::staff::create_employee,
        handlers::staff::update_employee,
        handlers::staff::delete_employee,
        handlers::staff::list_production_times,
        handlers::staff::get_production_time,
        handlers::staff::create_production_time,
        handlers::staff::update_production_time,
        handlers::staff::delete_production_time,

        handlers::calendar::list_events,
        handlers::calendar::get_event,
        handlers::calendar::create_event,
        handlers::calendar::update_event,
        handlers::calendar::delete_event,

        handlers::reports::dashboard,
        handlers::reports::planning,
        handlers::reports::etat_import,
        handlers::reports::etat_export,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::entities::DocumentStatus,
            crate::billing::Totals,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_workshop_routes() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("/api/fiche-coupe"));
        assert!(json.contains("/api/invoices/:id/status"));
        assert!(json.contains("bearer_auth"));
    }
}
