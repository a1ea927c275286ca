use eip712_credential::{
    key::{KeyManagerError, KeyMetadata, KeyType},
    CredentialProviderEip712, Error, IssueOptions, KeyManager, LocalKeyManager, ManagedIdentity,
    ManagedKey, ProofRole, StaticDIDResolver, VerifyOptions, VerifyResult,
};
use eip712_dids::{Document, VerificationMethod};
use serde_json::{json, Value};

// https://web3js.readthedocs.io/en/v1.2.11/web3-eth-accounts.html#privatekeytoaccount
const SECRET_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const ADDRESS: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";
const OTHER_ADDRESS: &str = "0xf3beac30c498d9e26865f34fcaa57dbb935b0d74";

const ISSUER: &str = "did:example:123";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn account_method(did: &str, fragment: &str, address: &str) -> VerificationMethod {
    VerificationMethod::new(
        format!("{did}#{fragment}"),
        "EcdsaSecp256k1RecoveryMethod2020".to_string(),
        did.to_string(),
    )
    .with_property("blockchainAccountId", format!("eip155:1:{address}"))
}

fn did_document(did: &str, methods: Vec<VerificationMethod>) -> Document {
    let mut document = Document::new(did.to_string());
    document.verification_method = methods;
    document
}

fn resolver(documents: Vec<Document>) -> StaticDIDResolver {
    let mut resolver = StaticDIDResolver::new();
    for document in documents {
        resolver.insert(document);
    }
    resolver
}

/// Key manager holding the test key for `did`.
fn key_manager(did: &str) -> (LocalKeyManager, ManagedKey) {
    let mut key_manager = LocalKeyManager::new();
    let key = key_manager.import_secp256k1(SECRET_KEY).unwrap();
    key_manager.insert_identity(did, vec![key.kid.clone()]);
    (key_manager, key)
}

fn provider(did: &str) -> CredentialProviderEip712<LocalKeyManager, StaticDIDResolver> {
    let (key_manager, _) = key_manager(did);
    let resolver = resolver(vec![did_document(
        did,
        vec![account_method(did, "controller", ADDRESS)],
    )]);
    CredentialProviderEip712::new(key_manager, resolver)
}

fn credential() -> Value {
    json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential"],
        "issuer": ISSUER,
        "credentialSubject": { "id": "did:example:456", "name": "Alice" }
    })
}

async fn issued_credential() -> Value {
    provider(ISSUER)
        .issue_credential(&credential(), &IssueOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn issue_and_verify_credential() {
    init_logger();
    let provider = provider(ISSUER);
    let input = credential();
    let vc = provider
        .issue_credential(&input, &IssueOptions::default())
        .await
        .unwrap();

    // The input is left untouched.
    assert_eq!(input, credential());

    let proof = &vc["proof"];
    assert_eq!(proof["type"], "EthereumEip712Signature2021");
    assert_eq!(proof["verificationMethod"], "did:example:123#controller");
    assert_eq!(proof["proofPurpose"], "assertionMethod");
    assert_eq!(proof["created"], vc["issuanceDate"]);
    assert!(!proof["proofValue"].as_str().unwrap().is_empty());
    assert_eq!(proof["eip712"]["primaryType"], "VerifiableCredential");
    assert_eq!(
        proof["eip712"]["domain"],
        json!({ "chainId": 1, "name": "VerifiableCredential", "version": "1" })
    );
    assert_eq!(
        proof["eip712"]["types"]["CredentialSubject"],
        json!([
            { "name": "id", "type": "string" },
            { "name": "name", "type": "string" }
        ])
    );
    assert!(provider.can_verify_document_type(&vc));

    let result = provider
        .verify_credential(&vc, &VerifyOptions::default())
        .await
        .unwrap();
    assert_eq!(result, VerifyResult::success());
}

#[tokio::test]
async fn signature_from_unknown_key() {
    let vc = issued_credential().await;

    let (key_manager, _) = key_manager(ISSUER);
    let resolver = resolver(vec![did_document(
        ISSUER,
        vec![account_method(ISSUER, "controller", OTHER_ADDRESS)],
    )]);
    let provider = CredentialProviderEip712::new(key_manager, resolver);
    let result = provider
        .verify_credential(&vc, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(!result.verified);
    let error = result.error.unwrap();
    assert_eq!(error.error_code, "invalid_signature");
    assert_eq!(
        error.message,
        "invalid_signature: The signature does not match any of the issuer signing keys"
    );
}

#[tokio::test]
async fn tampered_credential() {
    let provider = provider(ISSUER);
    let vc = issued_credential().await;

    let mut renamed = vc.clone();
    renamed["credentialSubject"]["name"] = json!("Mallory");
    match provider
        .verify_credential(&renamed, &VerifyOptions::default())
        .await
    {
        Ok(result) => assert!(!result.verified),
        Err(e) => assert!(matches!(e, Error::InvalidArgument(_))),
    }

    let mut backdated = vc.clone();
    backdated["proof"]["created"] = json!("2000-01-01T00:00:00.000Z");
    match provider
        .verify_credential(&backdated, &VerifyOptions::default())
        .await
    {
        Ok(result) => assert!(!result.verified),
        Err(e) => assert!(matches!(e, Error::InvalidArgument(_))),
    }

    // Properties missing from the signed types cannot be hashed.
    let mut extended = vc.clone();
    extended["credentialSubject"]["age"] = json!(42);
    assert!(matches!(
        provider
            .verify_credential(&extended, &VerifyOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn legacy_proof_encoding() {
    let provider = provider(ISSUER);
    let mut vc = issued_credential().await;

    let proof = vc["proof"].as_object_mut().unwrap();
    let mut info = proof.remove("eip712").unwrap();
    let info_object = info.as_object_mut().unwrap();
    let types = info_object.remove("types").unwrap();
    info_object.insert("messageSchema".to_string(), types);
    proof.insert("eip712Domain".to_string(), info);

    let result = provider
        .verify_credential(&vc, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(result.verified);
}

#[tokio::test]
async fn missing_proof() {
    let provider = provider(ISSUER);
    assert!(matches!(
        provider
            .verify_credential(&credential(), &VerifyOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));

    let mut vc = issued_credential().await;
    vc["proof"].as_object_mut().unwrap().remove("proofValue");
    assert!(matches!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));

    let mut vc = issued_credential().await;
    vc["proof"].as_object_mut().unwrap().remove("eip712");
    assert!(matches!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn resolution_errors() {
    let vc = issued_credential().await;

    let (key_manager, _) = key_manager(ISSUER);
    let empty = CredentialProviderEip712::new(
        key_manager,
        resolver(vec![did_document(ISSUER, Vec::new())]),
    );
    assert!(matches!(
        empty
            .verify_credential(&vc, &VerifyOptions::default())
            .await,
        Err(Error::ResolverError(_))
    ));

    let (key_manager, _) = self::key_manager(ISSUER);
    let unknown = CredentialProviderEip712::new(key_manager, StaticDIDResolver::new());
    assert!(matches!(
        unknown
            .verify_credential(&vc, &VerifyOptions::default())
            .await,
        Err(Error::ResolverError(_))
    ));
    assert!(matches!(
        unknown
            .issue_credential(&credential(), &IssueOptions::default())
            .await,
        Err(Error::ResolverError(_))
    ));
}

#[tokio::test]
async fn issuer_checks() {
    let provider = provider(ISSUER);

    let mut anonymous = credential();
    anonymous.as_object_mut().unwrap().remove("issuer");
    assert!(matches!(
        provider
            .issue_credential(&anonymous, &IssueOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));

    let mut unmanaged = credential();
    unmanaged["issuer"] = json!("did:example:unmanaged");
    assert!(matches!(
        provider
            .issue_credential(&unmanaged, &IssueOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));

    // Issuer objects and DID URLs designate the same issuer.
    let mut issuer_object = credential();
    issuer_object["issuer"] = json!({ "id": "did:example:123#controller", "name": "Example" });
    let vc = provider
        .issue_credential(&issuer_object, &IssueOptions::default())
        .await
        .unwrap();
    assert_eq!(vc["issuer"]["name"], "Example");
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

#[tokio::test]
async fn normalized_credential() {
    let provider = provider(ISSUER);
    let vc = provider
        .issue_credential(
            &json!({
                "type": "UniversityDegreeCredential",
                "issuer": ISSUER,
                "issuanceDate": "2010-01-01T19:23:24Z",
                "credentialSubject": { "id": "did:example:456", "degree": { "name": "Bachelor" } },
                "proof": { "type": "JwtProof2020", "jwt": "eyJ0eXAiOiJKV1QifQ.e30.c2ln" }
            }),
            &IssueOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        vc["@context"],
        json!(["https://www.w3.org/2018/credentials/v1"])
    );
    assert_eq!(
        vc["type"],
        json!(["VerifiableCredential", "UniversityDegreeCredential"])
    );
    assert_eq!(vc["proof"]["created"], "2010-01-01T19:23:24Z");
    assert!(vc["proof"].get("jwt").is_none());
    assert!(vc["proof"]["eip712"]["types"].get("Degree").is_some());
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

#[tokio::test]
async fn field_order_is_preserved() {
    let provider = provider(ISSUER);
    let vc = provider
        .issue_credential(
            &json!({
                "proof": { "type": "JwtProof2020", "jwt": "eyJ0eXAiOiJKV1QifQ.e30.c2ln" },
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "issuer": ISSUER,
                "issuanceDate": "2010-01-01T19:23:24Z",
                "credentialSubject": { "id": "did:example:456" }
            }),
            &IssueOptions::default(),
        )
        .await
        .unwrap();

    let expected = [
        "@context",
        "type",
        "issuer",
        "issuanceDate",
        "credentialSubject",
        "proof",
    ];
    let keys: Vec<&str> = vc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, expected);
    let members: Vec<&str> = vc["proof"]["eip712"]["types"]["VerifiableCredential"]
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["name"].as_str().unwrap())
        .collect();
    assert_eq!(members, expected);
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );

    // A signed credential whose proof is not last still verifies.
    let mut reordered = serde_json::Map::new();
    reordered.insert("proof".to_string(), vc["proof"].clone());
    for (name, value) in vc.as_object().unwrap() {
        if name != "proof" {
            reordered.insert(name.clone(), value.clone());
        }
    }
    assert!(
        provider
            .verify_credential(&Value::Object(reordered), &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

#[tokio::test]
async fn numeric_claims() {
    let provider = provider(ISSUER);
    let mut input = credential();
    input["credentialSubject"] = json!({
        "id": "did:example:456",
        "gpa": 3.5,
        "balance": -5,
        "credits": 18446744073709551615u64
    });
    let vc = provider
        .issue_credential(&input, &IssueOptions::default())
        .await
        .unwrap();

    assert_eq!(vc["credentialSubject"], input["credentialSubject"]);
    assert_eq!(
        vc["proof"]["eip712"]["types"]["CredentialSubject"],
        json!([
            { "name": "id", "type": "string" },
            { "name": "gpa", "type": "string" },
            { "name": "balance", "type": "int256" },
            { "name": "credits", "type": "uint256" }
        ])
    );
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

#[tokio::test]
async fn issue_and_verify_presentation() {
    let holder = "did:example:holder";
    let provider = provider(holder);
    let vc = issued_credential().await;

    let vp = provider
        .issue_presentation(
            &json!({
                "holder": holder,
                "verifiableCredential": [vc, "eyJ0eXAiOiJKV1QifQ.e30.c2ln"]
            }),
            &IssueOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(vp["type"], json!(["VerifiablePresentation"]));
    assert_eq!(vp["proof"]["eip712"]["primaryType"], "VerifiablePresentation");
    assert_eq!(
        vp["proof"]["eip712"]["domain"]["name"],
        "VerifiablePresentation"
    );
    let credentials = vp["verifiableCredential"].as_array().unwrap();
    assert!(credentials.iter().all(Value::is_string));
    assert_eq!(credentials[1], "eyJ0eXAiOiJKV1QifQ.e30.c2ln");

    let result = provider
        .verify_presentation(&vp, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(result.verified);

    // Presentations are verified against their holder.
    let mut forged = vp.clone();
    forged["holder"] = json!(ISSUER);
    assert!(matches!(
        provider
            .verify_presentation(&forged, &VerifyOptions::default())
            .await,
        Err(Error::ResolverError(_)) | Ok(VerifyResult { verified: false, .. })
    ));
}

#[tokio::test]
async fn presentation_requires_holder() {
    let provider = provider(ISSUER);
    assert!(matches!(
        provider
            .issue_presentation(&json!({ "verifiableCredential": [] }), &IssueOptions::default())
            .await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn key_selection() {
    let mut key_manager = LocalKeyManager::new();
    let published = key_manager.import_secp256k1(SECRET_KEY).unwrap();
    let unpublished = key_manager.generate_secp256k1();
    key_manager.insert_identity(ISSUER, vec![published.kid.clone(), unpublished.kid.clone()]);
    let resolver = resolver(vec![did_document(
        ISSUER,
        vec![account_method(ISSUER, "controller", ADDRESS)],
    )]);
    let provider = CredentialProviderEip712::new(key_manager, resolver);

    let vc = provider
        .issue_credential(&credential(), &IssueOptions::default())
        .await
        .unwrap();
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );

    let vc = provider
        .issue_credential(&credential(), &IssueOptions::with_key_ref(published.kid))
        .await
        .unwrap();
    assert_eq!(vc["proof"]["verificationMethod"], "did:example:123#controller");

    assert!(matches!(
        provider
            .issue_credential(&credential(), &IssueOptions::with_key_ref(unpublished.kid))
            .await,
        Err(Error::KeyNotFound(_))
    ));
}

/// Key manager advertising its keys under the proof type only.
struct ProofTypeKeyManager(LocalKeyManager);

impl KeyManager for ProofTypeKeyManager {
    async fn get_identity(&self, did: &str) -> Result<ManagedIdentity, KeyManagerError> {
        let mut identity = self.0.get_identity(did).await?;
        for key in &mut identity.keys {
            key.meta.algorithms = vec!["EthereumEip712Signature2021".to_string()];
        }
        Ok(identity)
    }

    async fn sign(
        &self,
        key_ref: &str,
        data: &[u8],
        algorithm: &str,
    ) -> Result<String, KeyManagerError> {
        self.0.sign(key_ref, data, algorithm).await
    }
}

#[tokio::test]
async fn key_tagged_with_proof_type() {
    let (key_manager, _) = key_manager(ISSUER);
    let provider = CredentialProviderEip712::new(
        ProofTypeKeyManager(key_manager),
        resolver(vec![did_document(
            ISSUER,
            vec![account_method(ISSUER, "controller", ADDRESS)],
        )]),
    );
    let identity = provider.key_manager().get_identity(ISSUER).await.unwrap();
    assert!(provider.supports_key(&identity.keys[0]));

    let vc = provider
        .issue_credential(&credential(), &IssueOptions::default())
        .await
        .unwrap();
    assert_eq!(vc["proof"]["verificationMethod"], "did:example:123#controller");
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

/// Key manager whose identity only holds keys unable to sign typed data.
struct Ed25519KeyManager;

impl KeyManager for Ed25519KeyManager {
    async fn get_identity(&self, did: &str) -> Result<ManagedIdentity, KeyManagerError> {
        Ok(ManagedIdentity {
            did: did.to_string(),
            keys: vec![ManagedKey {
                kid: "ed25519".to_string(),
                type_: KeyType::Ed25519,
                public_key_hex: "1a2b".to_string(),
                meta: KeyMetadata {
                    algorithms: vec!["Ed25519".to_string(), "EdDSA".to_string()],
                    properties: Default::default(),
                },
            }],
        })
    }

    async fn sign(&self, key_ref: &str, _: &[u8], _: &str) -> Result<String, KeyManagerError> {
        Err(KeyManagerError::UnknownKey(key_ref.to_string()))
    }
}

#[tokio::test]
async fn no_suitable_key() {
    let provider = CredentialProviderEip712::new(
        Ed25519KeyManager,
        resolver(vec![did_document(
            ISSUER,
            vec![account_method(ISSUER, "controller", ADDRESS)],
        )]),
    );
    let identity = provider.key_manager().get_identity(ISSUER).await.unwrap();
    assert!(!provider.supports_key(&identity.keys[0]));
    assert!(matches!(
        provider
            .issue_credential(&credential(), &IssueOptions::default())
            .await,
        Err(Error::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn chain_id_from_verification_method() {
    let did = format!("did:ethr:goerli:{ADDRESS}");
    let (key_manager, _) = key_manager(&did);
    let method = VerificationMethod::new(
        format!("{did}#controller"),
        "EcdsaSecp256k1RecoveryMethod2020".to_string(),
        did.clone(),
    )
    .with_property("ethereumAddress", ADDRESS);
    let provider = CredentialProviderEip712::new(
        key_manager,
        resolver(vec![did_document(&did, vec![method])]),
    );

    let mut input = credential();
    input["issuer"] = json!(did);
    let vc = provider
        .issue_credential(&input, &IssueOptions::default())
        .await
        .unwrap();
    assert_eq!(vc["proof"]["eip712"]["domain"]["chainId"], 5);
    assert!(
        provider
            .verify_credential(&vc, &VerifyOptions::default())
            .await
            .unwrap()
            .verified
    );
}

#[tokio::test]
async fn chain_id_defaults_to_mainnet() {
    let (key_manager, _) = key_manager(ISSUER);
    let method = VerificationMethod::new(
        format!("{ISSUER}#controller"),
        "EcdsaSecp256k1RecoveryMethod2020".to_string(),
        ISSUER.to_string(),
    )
    .with_property("ethereumAddress", ADDRESS);
    let provider = CredentialProviderEip712::new(
        key_manager,
        resolver(vec![did_document(ISSUER, vec![method])]),
    );

    let vc = provider
        .issue_credential(&credential(), &IssueOptions::default())
        .await
        .unwrap();
    assert_eq!(vc["proof"]["eip712"]["domain"]["chainId"], 1);
}

#[tokio::test]
async fn role_generic_entry_points() {
    let provider = provider(ISSUER);
    let vc = provider
        .issue(&credential(), ProofRole::Credential, &IssueOptions::default())
        .await
        .unwrap();
    let result = provider
        .verify(&vc, ProofRole::Credential, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(result.verified);
}
