// ABOUTME: Sync protocol: read-only queries against the provider.
// ABOUTME: Lists groups, fetches a group's raw configuration, or lists a group's instances.

use crate::cloud::{AccountContext, CloudProvider};

use super::context::TaskContext;
use super::error::TaskError;
use super::instances::group_instances;
use super::params::{SyncCommand, SyncParameters};
use super::result::SyncResponse;

pub(crate) async fn run<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: SyncParameters,
) -> Result<SyncResponse, TaskError> {
    match params.command_type {
        SyncCommand::ListGroups => {
            let account = AccountContext {
                account_id: params.header.account_id.clone(),
            };
            let groups = ctx.cloud.list_groups(&account).await?;
            ctx.log.info(format!("Found {} Elastigroup(s)", groups.len()));
            Ok(SyncResponse::Groups { groups })
        }
        SyncCommand::GetGroupConfig => {
            let group_id = params.group_id.ok_or(TaskError::MissingParameter("group_id"))?;
            let config = ctx.cloud.get_raw_config(&group_id).await?;
            ctx.log
                .info(format!("Fetched configuration of Elastigroup: [{group_id}]"));
            Ok(SyncResponse::GroupConfig { group_id, config })
        }
        SyncCommand::ListGroupInstances => {
            let group_id = params.group_id.ok_or(TaskError::MissingParameter("group_id"))?;
            let instances = group_instances(ctx, &group_id).await?;
            ctx.log.info(format!(
                "Elastigroup: [{group_id}] has {} instance(s)",
                instances.len()
            ));
            Ok(SyncResponse::Instances {
                group_id,
                instances,
            })
        }
        SyncCommand::Unrecognized(command) => Err(TaskError::UnrecognizedSyncCommand(command)),
    }
}
