// crates/api-gateway-server/src/tools/staff.rs
// ============================================================================
// Module: Staff Capabilities
// Description: get_staff and create_staff.
// Purpose: Expose the staff service through the registry.
// Dependencies: api-gateway-core, api-gateway-services
// ============================================================================

use std::sync::Arc;

use api_gateway_core::Arguments;
use api_gateway_core::CapabilityName;
use api_gateway_core::DynamicValue;
use api_gateway_core::ExecutionContext;
use api_gateway_core::Operation;
use api_gateway_core::OperationError;
use api_gateway_core::ParameterSchema;
use api_gateway_core::ParameterType;
use api_gateway_core::RegistryBuilder;
use api_gateway_services::NewStaff;
use api_gateway_services::Services;
use api_gateway_services::StaffService;
use async_trait::async_trait;

use super::RegistrationError;
use super::optional_string;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Registers the staff capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetStaff,
        "Get detailed information about a staff member by ID",
        ParameterSchema::builder()
            .required("id", ParameterType::String, "The ID of the staff member")
            .build(),
        GetStaff {
            staff: Arc::clone(&services.staff),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateStaff,
        "Create a new staff member",
        ParameterSchema::builder()
            .required("firstName", ParameterType::String, "Staff's first name")
            .required("lastName", ParameterType::String, "Staff's last name")
            .required("email", ParameterType::String, "Staff's email address")
            .required("phoneNumber", ParameterType::String, "Staff's phone number")
            .optional("title", ParameterType::String, "Staff's title/position")
            .optional("office", ParameterType::String, "Staff's office location")
            .build(),
        CreateStaff {
            staff: Arc::clone(&services.staff),
        },
    )
}

/// Fetches one staff member.
struct GetStaff {
    /// Staff backend.
    staff: Arc<dyn StaffService>,
}

#[async_trait]
impl Operation for GetStaff {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let id = args.require_str("id")?;
        let staff = self.staff.get_staff(ctx, id).await.map_err(service_failure)?;
        to_value(&staff)
    }
}

/// Creates a staff member.
struct CreateStaff {
    /// Staff backend.
    staff: Arc<dyn StaffService>,
}

#[async_trait]
impl Operation for CreateStaff {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewStaff {
            first_name: args.require_str("firstName")?.to_string(),
            last_name: args.require_str("lastName")?.to_string(),
            email: args.require_str("email")?.to_string(),
            phone_number: args.require_str("phoneNumber")?.to_string(),
            title: optional_string(args, "title")?,
            office: optional_string(args, "office")?,
        };
        let staff = self.staff.create_staff(ctx, input).await.map_err(service_failure)?;
        to_value(&staff)
    }
}
