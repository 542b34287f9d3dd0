//! Contract factory: builds creation transactions from an [`Artifact`].

use alloy::{
    contract::RawCallBuilder,
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    primitives::Bytes,
    providers::Provider,
};
use tracing::debug;

use crate::{
    artifact::Artifact,
    deployer::{self, DeployError, Deployment},
};

/// Deploys instances of one compiled contract through a provider.
#[derive(Debug, Clone)]
pub struct ContractFactory<P> {
    artifact: Artifact,
    provider: P,
}

impl<P> ContractFactory<P> {
    pub fn new(artifact: Artifact, provider: P) -> Self {
        Self { artifact, provider }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    ///
    /// Arguments are given as strings and parsed according to the constructor's
    /// parameter types, e.g. `"42"` for `uint256` or `"[1,2]"` for `uint8[]`.
    pub fn deploy_data<S: AsRef<str>>(&self, args: &[S]) -> Result<Bytes, DeployError> {
        let Some(ctor) = &self.artifact.abi.constructor else {
            if !args.is_empty() {
                return Err(DeployError::ArgCount {
                    expected: 0,
                    got: args.len(),
                });
            }
            return Ok(self.artifact.bytecode.clone());
        };

        if ctor.inputs.len() != args.len() {
            return Err(DeployError::ArgCount {
                expected: ctor.inputs.len(),
                got: args.len(),
            });
        }

        let values = ctor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param.resolve()?;
                ty.coerce_str(arg.as_ref())
                    .map_err(|source| DeployError::InvalidArg {
                        name: param.name.clone(),
                        ty: param.ty.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<DynSolValue>, DeployError>>()?;

        let encoded = ctor.abi_encode_input(&values)?;
        debug!(
            contract = %self.artifact.name,
            bytes = encoded.len(),
            "encoded constructor arguments"
        );
        Ok([&self.artifact.bytecode[..], &encoded[..]].concat().into())
    }
}

impl<P: Provider> ContractFactory<P> {
    /// Creation transaction for the contract, not yet sent.
    pub fn deploy_builder<S: AsRef<str>>(
        &self,
        args: &[S],
    ) -> Result<RawCallBuilder<&P>, DeployError> {
        let data = self.deploy_data(args)?;
        Ok(RawCallBuilder::new_raw_deploy(&self.provider, data))
    }

    /// Deploy the contract, wait until it is mined and check that code landed.
    pub async fn deploy<S: AsRef<str>>(&self, args: &[S]) -> Result<Deployment, DeployError> {
        let tx = self.deploy_builder(args)?;
        let deployment = deployer::deploy(&self.artifact.name, tx).await?;
        deployer::ensure_code(&self.provider, deployment.address).await?;
        Ok(deployment)
    }
}
