use synergy::actions::Action;
use synergy::core::crypto::Hash;
use synergy::governance::{Hooks, NotifyAction};
use synergy::node::core::{Node, NodeConfig, NodeError, SynergyNode};
use tokio::sync::mpsc::unbounded_channel;

const ALICE: &str = "0101010101010101010101010101010101010101010101010101010101010101";
const BOB: &str = "0202020202020202020202020202020202020202020202020202020202020202";

fn parse(line: String) -> Action {
    serde_json::from_str(&line).unwrap()
}

fn signin(token: &str, handle: &str) -> Action {
    parse(format!(
        r#"{{"kind":"signin","epoch":1,"author":"{}","handle":"{}"}}"#,
        token, handle
    ))
}

#[tokio::test]
async fn test_json_actions_through_the_node() {
    let mut config = NodeConfig::default();
    config.governance.proposal_deadline = 5;
    let mut node = SynergyNode::new(config).await.unwrap();
    let (tx, mut rx) = unbounded_channel();
    node.set_hooks(Hooks::new(None, Some(tx)));
    node.start().await.unwrap();
    let handle = node.handle().unwrap();

    handle.apply(signin(ALICE, "alice")).await.unwrap();
    handle.apply(signin(BOB, "bob")).await.unwrap();
    handle
        .apply(parse(format!(
            r#"{{"kind":"create_collective","epoch":2,"author":"{}","name":"garden","description":"","policy":{{"majority":50,"super_majority":50}}}}"#,
            ALICE
        )))
        .await
        .unwrap();

    let request = parse(format!(
        r#"{{"kind":"request_membership","epoch":3,"author":"{}","collective":"garden","include":true}}"#,
        BOB
    ));
    let hash: Hash = request.hashed();
    handle.apply(request).await.unwrap();
    assert!(handle.pooling(hash).await.unwrap().is_some());

    let rejected = handle.apply(signin(BOB, "bobby")).await.unwrap_err();
    assert!(rejected.is_rejection());

    handle
        .apply(parse(format!(
            r#"{{"kind":"vote","epoch":4,"author":"{}","hash":"{}","approve":true}}"#,
            ALICE, hash
        )))
        .await
        .unwrap();
    assert!(handle.pooling(hash).await.unwrap().is_none());

    let update = rx.recv().await.unwrap();
    assert_eq!(update.action, NotifyAction::AcceptProposal);
    assert_eq!(update.hash, hash);

    node.stop().await.unwrap();
    assert!(matches!(
        handle.apply(signin(ALICE, "again")).await,
        Err(NodeError::EngineStopped)
    ));
}
