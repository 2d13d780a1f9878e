// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential token and staking contract interfaces.
//!
//! Encrypted amounts travel as `bytes32` handles; the ciphertexts
//! themselves never leave the coprocessor.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IConfidentialToken {
        function confidentialBalanceOf(address account) external view returns (bytes32);
        function claim(uint64 amount) external;
        function confidentialTransferAndCall(
            address to,
            bytes32 encryptedAmount,
            bytes inputProof,
            bytes data
        ) external returns (bytes32);
    }
}

sol! {
    #[sol(rpc)]
    interface IConfidentialStaking {
        function confidentialStakedBalance(address asset, address account) external view returns (bytes32);
        function withdraw(address asset, bytes32 encryptedAmount, bytes inputProof) external;
    }
}
