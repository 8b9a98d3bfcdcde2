//! Access-log bucket for the load balancer

use crate::manifest::{ResourceRef, Stack};
use crate::Result;
use serde_json::json;

pub const BUCKET_TYPE: &str = "AWS::S3::Bucket";
pub const BUCKET_POLICY_TYPE: &str = "AWS::S3::BucketPolicy";

/// Tag that makes the provisioning layer empty the bucket before deleting it
pub const AUTO_DELETE_OBJECTS_TAG: &str = "aws-cdk:auto-delete-objects";

const ELB_LOG_DELIVERY_PRINCIPAL: &str = "logdelivery.elasticloadbalancing.amazonaws.com";

#[derive(Clone, Debug)]
pub struct AccessLogsBucket {
    pub bucket: ResourceRef,
    pub policy: ResourceRef,
}

/// Encrypted, fully private bucket purged together with the stack
pub fn add_access_logs_bucket(stack: &mut Stack) -> Result<AccessLogsBucket> {
    let construct_id = format!("{}-AccessLogsBucket", stack.name());

    let bucket = stack.add_resource(
        &construct_id,
        BUCKET_TYPE,
        json!({
            "AccessControl": "LogDeliveryWrite",
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
                }],
            },
            "OwnershipControls": {
                "Rules": [{ "ObjectOwnership": "ObjectWriter" }],
            },
            "PublicAccessBlockConfiguration": {
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true,
            },
            "Tags": [{ "Key": AUTO_DELETE_OBJECTS_TAG, "Value": "true" }],
        }),
    )?;

    {
        let resource = stack.resource_mut(&bucket)?;
        resource.destroy_with_stack();
        resource.suppress_rule("AwsSolutions-S1", "This is the logging bucket.");
    }

    let arn = bucket.get_att("Arn");
    let policy = stack.add_resource(
        &format!("{}/Policy", construct_id),
        BUCKET_POLICY_TYPE,
        json!({
            "Bucket": bucket.reference(),
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Deny",
                        "Principal": { "AWS": "*" },
                        "Action": "s3:*",
                        "Resource": [arn, { "Fn::Join": ["", [arn, "/*"]] }],
                        "Condition": { "Bool": { "aws:SecureTransport": "false" } },
                    },
                    {
                        "Effect": "Allow",
                        "Principal": { "Service": ELB_LOG_DELIVERY_PRINCIPAL },
                        "Action": "s3:PutObject",
                        "Resource": {
                            "Fn::Join": ["", [arn, "/AWSLogs/", { "Ref": "AWS::AccountId" }, "/*"]],
                        },
                    },
                ],
            },
        }),
    )?;

    Ok(AccessLogsBucket { bucket, policy })
}

/// Point the load balancer's access logs at the bucket
pub fn enable_access_logs(stack: &mut Stack, load_balancer: &ResourceRef, logs: &AccessLogsBucket) -> Result<()> {
    let resource = stack.resource_mut(load_balancer)?;
    resource.push_property(
        "LoadBalancerAttributes",
        json!({ "Key": "access_logs.s3.enabled", "Value": "true" }),
    );
    resource.push_property(
        "LoadBalancerAttributes",
        json!({ "Key": "access_logs.s3.bucket", "Value": logs.bucket.reference() }),
    );

    // Log delivery is verified when the attribute is set
    stack.add_dependency(load_balancer, &logs.policy)
}
