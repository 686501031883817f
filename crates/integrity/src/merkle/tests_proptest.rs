//! Property-based tests for the Merkle tree

#[cfg(test)]
mod proptest_tests {
    use crate::hashing::hash_str;
    use crate::merkle::{build_proof, compute_root, verify_proof};
    use proptest::prelude::*;

    fn digests(contents: &[String]) -> Vec<String> {
        contents.iter().map(|c| hash_str(c)).collect()
    }

    proptest! {
        #[test]
        fn test_root_is_deterministic(contents in prop::collection::vec("[a-z]{1,10}", 1..40)) {
            let leaves = digests(&contents);
            prop_assert!(compute_root(&leaves).is_some());
            prop_assert_eq!(compute_root(&leaves), compute_root(&leaves.clone()));
        }

        #[test]
        fn test_every_proof_verifies(
            contents in prop::collection::vec("[a-z]{1,10}", 1..40),
            pick in any::<prop::sample::Index>()
        ) {
            let leaves = digests(&contents);
            let index = pick.index(leaves.len());
            let root = compute_root(&leaves).unwrap();

            let proof = build_proof(&leaves, index).unwrap();
            prop_assert_eq!(&proof.root, &root);
            prop_assert!(verify_proof(&proof));
        }

        #[test]
        fn test_swapping_distinct_leaves_changes_root(
            contents in prop::collection::hash_set("[a-z]{1,10}", 2..20)
        ) {
            let contents: Vec<String> = contents.into_iter().collect();
            let leaves = digests(&contents);
            let mut swapped = leaves.clone();
            swapped.swap(0, 1);
            prop_assert_ne!(compute_root(&leaves), compute_root(&swapped));
        }
    }
}
