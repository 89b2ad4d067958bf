//! End-to-end unlock workflow tests over the in-memory store and mock wallet

use anyhow::Result;
use cosmo_matrix::client::{connect_and_register, UnlockState, UnlockWorkflow};
use cosmo_matrix::services::LevelService;
use cosmo_matrix::store::memory::MemoryStore;
use cosmo_matrix::wallet::{MockWallet, WalletSession};
use std::sync::Arc;

const TREASURY: &str = "0x00000000000000000000000000000000000cab1e";

async fn connected_session(wallet: &MockWallet) -> Result<WalletSession> {
    Ok(WalletSession::connect(wallet).await?)
}

#[tokio::test]
async fn workflow_unlocks_levels_end_to_end() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user("0xfeed", &[1]);
    let service = LevelService::new(store.clone());
    let wallet = MockWallet::new(vec!["0xFEED".to_string()]);
    let session = connected_session(&wallet).await?;

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&session, user.id, 3).await;

    assert_eq!(
        state,
        UnlockState::Done {
            unlocked_levels: vec![2, 3]
        }
    );
    assert_eq!(
        workflow.states(),
        &[
            UnlockState::Idle,
            UnlockState::CheckingLevels,
            UnlockState::AwaitingWalletSignature,
            UnlockState::ConfirmingPurchase,
            UnlockState::Done {
                unlocked_levels: vec![2, 3]
            },
        ]
    );

    // One payment of 0.02 + 0.04 BNB in wei, to the treasury
    let sent = wallet.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "0xfeed");
    assert_eq!(sent[0].1, TREASURY);
    assert_eq!(sent[0].2, 60_000_000_000_000_000);

    // Ledger and notification landed
    assert_eq!(store.ledger_rows().len(), 2);
    assert_eq!(store.notification_rows().len(), 1);
    Ok(())
}

#[tokio::test]
async fn workflow_finishes_early_when_nothing_is_owed() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user("0xfeed", &[1, 2, 3]);
    let service = LevelService::new(store.clone());
    let wallet = MockWallet::new(vec!["0xfeed".to_string()]);
    let session = connected_session(&wallet).await?;

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&session, user.id, 3).await;

    assert_eq!(
        state,
        UnlockState::Done {
            unlocked_levels: vec![]
        }
    );
    assert!(wallet.sent_transactions().is_empty());
    assert!(store.ledger_rows().is_empty());
    Ok(())
}

#[tokio::test]
async fn workflow_fails_without_a_connected_wallet() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user("0xfeed", &[]);
    let service = LevelService::new(store);
    let wallet = MockWallet::new(vec![]);

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&WalletSession::disconnected(), user.id, 2).await;

    assert!(matches!(state, UnlockState::Failed { .. }));
    Ok(())
}

#[tokio::test]
async fn wallet_rejection_leaves_levels_locked() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user("0xfeed", &[]);
    let service = LevelService::new(store.clone());
    let wallet = MockWallet::new(vec!["0xfeed".to_string()]);
    wallet.set_fail_sends(true);
    let session = connected_session(&wallet).await?;

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&session, user.id, 2).await;

    let UnlockState::Failed { message } = state else {
        panic!("expected failure, got {:?}", workflow.states().last());
    };
    assert!(message.contains("denied"));

    // No confirmation ran
    assert!(store.ledger_rows().is_empty());
    let plan = service.check_levels(user.id, 2).await?;
    assert_eq!(plan.levels_to_purchase, vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn connect_registers_a_fresh_wallet_and_unlocks_from_scratch() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let service = LevelService::new(store.clone());
    let wallet = MockWallet::new(vec!["0xNEW".to_string()]);

    let (session, user) = connect_and_register(&service, &wallet).await?;
    assert_eq!(user.wallet_address, "0xnew");
    assert_eq!(session.account(), Some("0xnew"));

    // Second connect finds the same user
    let (_, again) = connect_and_register(&service, &wallet).await?;
    assert_eq!(again.id, user.id);

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&session, user.id, 1).await;
    assert_eq!(
        state,
        UnlockState::Done {
            unlocked_levels: vec![1]
        }
    );
    Ok(())
}

#[tokio::test]
async fn workflow_fails_for_unknown_user() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let service = LevelService::new(store);
    let wallet = MockWallet::new(vec!["0xfeed".to_string()]);
    let session = connected_session(&wallet).await?;

    let mut workflow = UnlockWorkflow::new(&service, &wallet, TREASURY);
    let state = workflow.run(&session, uuid::Uuid::new_v4(), 2).await;

    assert!(matches!(state, UnlockState::Failed { .. }));
    assert!(wallet.sent_transactions().is_empty());
    Ok(())
}
