//! Pre-built Test Fixtures
//!
//! Ready-to-use actors and amounts for claims lifecycle tests. Each actor
//! fixture mirrors one staff role, carrying exactly the permissions that
//! role is granted in production.

use core_kernel::{Currency, Money, UserId};
use domain_claims::{Actor, Permission};
use rust_decimal_macros::dec;

/// Fixture for acting identities, one per staff role
pub struct ActorFixtures;

impl ActorFixtures {
    /// A member who can submit their own claims
    pub fn member() -> Actor {
        Actor::new(UserId::new(), [Permission::CanSubmitClaim])
    }

    /// An HR officer who reviews submitted claims
    pub fn hr_officer() -> Actor {
        Actor::new(
            UserId::new(),
            [
                Permission::CanApproveHr,
                Permission::CanRejectHr,
                Permission::CanViewAllClaims,
            ],
        )
    }

    /// A broker agent who processes claims and relays insurer decisions
    pub fn broker_agent() -> Actor {
        Actor::new(
            UserId::new(),
            [Permission::CanProcessBroker, Permission::CanViewAllClaims],
        )
    }

    /// A finance officer who settles approved claims
    pub fn finance_officer() -> Actor {
        Actor::new(UserId::new(), [Permission::CanApprovePayment])
    }

    /// An actor holding every permission
    pub fn superuser() -> Actor {
        Actor::new(UserId::new(), Permission::ALL)
    }

    /// An actor holding no permissions at all
    pub fn stranger() -> Actor {
        Actor::without_permissions(UserId::new())
    }
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A routine out-patient claim amount
    pub fn sar_850() -> Money {
        Money::new(dec!(850.00), Currency::SAR)
    }

    /// A settlement amount
    pub fn sar_1500() -> Money {
        Money::new(dec!(1500.00), Currency::SAR)
    }

    /// A zero amount
    pub fn sar_zero() -> Money {
        Money::zero(Currency::SAR)
    }

    /// A foreign-currency amount for international treatment tests
    pub fn usd_400() -> Money {
        Money::new(dec!(400.00), Currency::USD)
    }

    /// A three-decimal-place amount for rounding tests
    pub fn kwd_125() -> Money {
        Money::new(dec!(12.500), Currency::KWD)
    }
}
