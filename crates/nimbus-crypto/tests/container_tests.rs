//! End-to-end tests for the chunked container format

use nimbus_crypto::{
    CHUNK_OVERHEAD, CryptoError, DEFAULT_CHUNK_SIZE, HEADER_LEN, MasterKey, StreamDecryptor,
    StreamEncryptor, WRAPPED_KEY_LEN, decrypt_bytes, encrypt_bytes, format,
};
use proptest::prelude::*;
use rand::RngCore;

const PREFIX_LEN: usize = HEADER_LEN + WRAPPED_KEY_LEN;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut data);
    data
}

fn random_master() -> MasterKey {
    let mut key = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key);
    MasterKey::from_bytes(&key).unwrap()
}

#[test]
fn empty_plaintext_under_zero_key() {
    let master = MasterKey::from_bytes(&[0u8; 32]).unwrap();

    let encrypted = encrypt_bytes(b"", &master, DEFAULT_CHUNK_SIZE, None).unwrap();
    // header(12) + wrapped fek(60) + one empty chunk(36)
    assert_eq!(encrypted.len(), PREFIX_LEN + CHUNK_OVERHEAD);

    let decrypted = decrypt_bytes(&encrypted, &master, None).unwrap();
    assert!(decrypted.is_empty());
}

#[test]
fn hello_world_single_chunk() {
    let master = MasterKey::from_bytes(&(1..=32).collect::<Vec<u8>>()).unwrap();
    let plaintext = b"hello world";

    let encrypted = encrypt_bytes(plaintext, &master, DEFAULT_CHUNK_SIZE, None).unwrap();
    assert_eq!(encrypted.len(), PREFIX_LEN + CHUNK_OVERHEAD + plaintext.len());

    let decrypted = decrypt_bytes(&encrypted, &master, None).unwrap();
    assert_eq!(decrypted.as_slice(), plaintext.as_slice());
}

#[test]
fn three_mib_yields_three_ordered_chunks() {
    let master = random_master();
    let plaintext = random_bytes(3 * 1024 * 1024);
    let chunk_size = 1024 * 1024;

    let encrypted = encrypt_bytes(&plaintext, &master, chunk_size, None).unwrap();

    // walk the records and check the indices
    let mut indices = Vec::new();
    let mut offset = PREFIX_LEN;
    while offset < encrypted.len() {
        let (header, sealed) = format::split_chunk(&encrypted[offset..]).unwrap();
        indices.push(header.index);
        offset += format::CHUNK_HEADER_LEN + sealed.len();
    }
    assert_eq!(indices, vec![0, 1, 2]);

    assert_eq!(decrypt_bytes(&encrypted, &master, None).unwrap(), plaintext);
}

#[test]
fn tag_flip_in_second_chunk_fails_at_index_one() {
    let master = random_master();
    let plaintext = random_bytes(3 * 1024 * 1024);
    let chunk_size = 1024 * 1024;
    let record_len = CHUNK_OVERHEAD + chunk_size;

    let mut encrypted = encrypt_bytes(&plaintext, &master, chunk_size, None).unwrap();

    // flip bit 0 of the second chunk's tag
    let tag_pos = PREFIX_LEN + 2 * record_len - 1 - 15;
    encrypted[tag_pos] ^= 0x01;

    let mut decryptor = StreamDecryptor::new(&encrypted[..PREFIX_LEN], &master).unwrap();
    let c0 = &encrypted[PREFIX_LEN..PREFIX_LEN + record_len];
    let c1 = &encrypted[PREFIX_LEN + record_len..PREFIX_LEN + 2 * record_len];

    assert!(decryptor.decrypt_chunk(c0).is_ok());
    assert!(matches!(
        decryptor.decrypt_chunk(c1),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn wrong_master_key_fails_without_plaintext() {
    let master1 = random_master();
    let master2 = random_master();

    let encrypted = encrypt_bytes(b"sensitive", &master1, DEFAULT_CHUNK_SIZE, None).unwrap();
    assert!(matches!(
        StreamDecryptor::new(&encrypted[..PREFIX_LEN], &master2),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn any_single_byte_mutation_is_detected() {
    let master = random_master();
    let encrypted = encrypt_bytes(b"tamper target", &master, DEFAULT_CHUNK_SIZE, None).unwrap();

    for pos in 0..encrypted.len() {
        let mut mutated = encrypted.clone();
        mutated[pos] ^= 0x01;
        // reserved header bytes are explicitly ignored on read
        if (5..8).contains(&pos) {
            continue;
        }
        assert!(
            decrypt_bytes(&mutated, &master, None).is_err(),
            "mutation at byte {} went undetected",
            pos
        );
    }
}

#[test]
fn swapped_chunks_fail_on_first_misordered() {
    let master = random_master();
    let plaintext = random_bytes(4096);
    let chunk_size = 1024;
    let record_len = CHUNK_OVERHEAD + chunk_size;

    let encrypted = encrypt_bytes(&plaintext, &master, chunk_size, None).unwrap();

    // swap chunk records 1 and 2
    let mut swapped = encrypted[..PREFIX_LEN].to_vec();
    let chunk = |i: usize| &encrypted[PREFIX_LEN + i * record_len..PREFIX_LEN + (i + 1) * record_len];
    swapped.extend_from_slice(chunk(0));
    swapped.extend_from_slice(chunk(2));
    swapped.extend_from_slice(chunk(1));
    swapped.extend_from_slice(chunk(3));

    let mut decryptor = StreamDecryptor::new(&swapped[..PREFIX_LEN], &master).unwrap();
    assert!(decryptor.decrypt_chunk(chunk(0)).is_ok());
    assert!(decryptor.decrypt_chunk(chunk(2)).is_err());
}

#[test]
fn truncation_is_visible_to_length_aware_callers() {
    let master = random_master();
    let plaintext = random_bytes(3000);
    let chunk_size = 1000;
    let record_len = CHUNK_OVERHEAD + chunk_size;

    let encrypted = encrypt_bytes(&plaintext, &master, chunk_size, None).unwrap();

    // dropping the trailing chunk still decrypts; the caller that knows the
    // expected size catches the shortfall
    let truncated = &encrypted[..encrypted.len() - record_len];
    let decrypted = decrypt_bytes(truncated, &master, None).unwrap();
    assert_eq!(decrypted.len(), 2000);
    assert!(decrypted.len() < plaintext.len());
    assert_eq!(decrypted.as_slice(), &plaintext[..2000]);
}

#[test]
fn containers_are_never_identical_for_same_input() {
    let master = random_master();
    let a = encrypt_bytes(b"same input", &master, DEFAULT_CHUNK_SIZE, None).unwrap();
    let b = encrypt_bytes(b"same input", &master, DEFAULT_CHUNK_SIZE, None).unwrap();
    // fresh FEK and nonces every session
    assert_ne!(a, b);
}

#[test]
fn streaming_and_oneshot_are_interoperable() {
    let master = random_master();
    let plaintext = random_bytes(2500);

    let (mut encryptor, prefix) = StreamEncryptor::new(&master).unwrap();
    let mut container = prefix.to_vec();
    for (i, chunk) in plaintext.chunks(1000).enumerate() {
        container.extend_from_slice(&encryptor.encrypt_chunk(chunk, i as u32).unwrap());
    }
    encryptor.finalize();

    assert_eq!(decrypt_bytes(&container, &master, None).unwrap(), plaintext);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        chunk_size in 1usize..4096,
    ) {
        let master = random_master();
        let encrypted = encrypt_bytes(&data, &master, chunk_size, None).unwrap();
        let decrypted = decrypt_bytes(&encrypted, &master, None).unwrap();
        prop_assert_eq!(decrypted, data);
    }
}
