//! Client-side unlock workflow
//!
//! Drives one purchase end to end: check which levels are owed, pay through
//! the wallet, then confirm against the API. Failures stop the run; the
//! caller decides whether to start over.

use anyhow::Context;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::User;
use crate::services::{LevelService, PurchaseApi};
use crate::store::MatrixStore;
use crate::wallet::{to_wei, WalletProvider, WalletSession};

/// Workflow progress, reported to the UI after every transition.
#[derive(Debug, Clone, PartialEq)]
pub enum UnlockState {
    Idle,
    CheckingLevels,
    AwaitingWalletSignature,
    ConfirmingPurchase,
    Done { unlocked_levels: Vec<i16> },
    Failed { message: String },
}

impl UnlockState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UnlockState::Done { .. } | UnlockState::Failed { .. })
    }
}

/// One unlock attempt over an API client and a wallet provider.
pub struct UnlockWorkflow<'a, A, W> {
    api: &'a A,
    wallet: &'a W,
    treasury_address: String,
    states: Vec<UnlockState>,
}

impl<'a, A: PurchaseApi, W: WalletProvider> UnlockWorkflow<'a, A, W> {
    pub fn new(api: &'a A, wallet: &'a W, treasury_address: impl Into<String>) -> Self {
        Self {
            api,
            wallet,
            treasury_address: treasury_address.into(),
            states: vec![UnlockState::Idle],
        }
    }

    /// Every state the workflow passed through, oldest first.
    pub fn states(&self) -> &[UnlockState] {
        &self.states
    }

    fn transition(&mut self, state: UnlockState) -> UnlockState {
        self.states.push(state.clone());
        state
    }

    fn fail(&mut self, message: impl Into<String>) -> UnlockState {
        self.transition(UnlockState::Failed {
            message: message.into(),
        })
    }

    /// Run the workflow to a terminal state. No retries: a wallet rejection
    /// or API error lands in `Failed` and the purchase is untouched.
    pub async fn run(
        &mut self,
        session: &WalletSession,
        user_id: Uuid,
        target_level: i16,
    ) -> UnlockState {
        let Some(account) = session.account() else {
            return self.fail("wallet is not connected");
        };
        let account = account.to_string();

        self.transition(UnlockState::CheckingLevels);
        let plan = match self.api.check_levels(user_id, target_level).await {
            Ok(plan) => plan,
            Err(e) => return self.fail(e.to_string()),
        };

        if plan.nothing_to_purchase() {
            return self.transition(UnlockState::Done {
                unlocked_levels: Vec::new(),
            });
        }

        let Some(value_wei) = to_wei(plan.total_cost) else {
            return self.fail(format!("cannot convert {} to wei", plan.total_cost));
        };

        self.transition(UnlockState::AwaitingWalletSignature);
        let tx_hash = match self
            .wallet
            .send_transaction(&account, &self.treasury_address, value_wei)
            .await
        {
            Ok(hash) => hash,
            Err(e) => return self.fail(e.to_string()),
        };

        self.transition(UnlockState::ConfirmingPurchase);
        let unlocked = match self
            .api
            .confirm_purchase(
                user_id,
                &plan.levels_to_purchase,
                &tx_hash,
                plan.total_cost,
            )
            .await
        {
            Ok(levels) => levels,
            Err(e) => return self.fail(e.to_string()),
        };

        self.transition(UnlockState::Done {
            unlocked_levels: unlocked,
        })
    }
}

/// Connect the wallet and make sure a user row exists for its account,
/// creating it (with the ten level rows) on first sight.
pub async fn connect_and_register<S: MatrixStore, P: WalletProvider>(
    service: &LevelService<S>,
    provider: &P,
) -> anyhow::Result<(WalletSession, User)> {
    let session = WalletSession::connect(provider).await?;
    let account = session
        .account()
        .context("connected wallet session has no account")?
        .to_string();
    let user = service.register_user(&account, None).await?;
    Ok((session, user))
}

/// Total owed for the run, for display before the wallet prompt.
pub fn format_cost(total_cost: Decimal) -> String {
    format!("{} BNB", total_cost.normalize())
}
