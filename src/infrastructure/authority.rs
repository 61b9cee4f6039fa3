use crate::domain::directory::Employee;
use crate::domain::ports::ApprovalAuthority;
use crate::domain::request_booking::RequestBooking;
use crate::error::Result;
use async_trait::async_trait;

/// Approvers may decide on any request of their own company; travelers may
/// confirm their own selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleBasedAuthority;

#[async_trait]
impl ApprovalAuthority for RoleBasedAuthority {
    async fn can_approve(&self, approver: &Employee, request: &RequestBooking) -> Result<bool> {
        if approver.id == request.employee {
            return Ok(true);
        }
        let same_company = request
            .company
            .as_deref()
            .is_none_or(|c| c == approver.company);
        Ok(approver.can_approve() && same_company)
    }
}
