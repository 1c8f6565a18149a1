/// Resource types that accept a `tags` property.
const TAGGABLE_TYPES: [&str; 16] = [
    "aws:cloudwatch/logGroup:LogGroup",
    "aws:dynamodb/table:Table",
    "aws:ebs/snapshot:Snapshot",
    "aws:ebs/volume:Volume",
    "aws:ec2/instance:Instance",
    "aws:ec2/securityGroup:SecurityGroup",
    "aws:ec2/subnet:Subnet",
    "aws:ec2/vpc:Vpc",
    "aws:ecs/cluster:Cluster",
    "aws:iam/role:Role",
    "aws:kms/key:Key",
    "aws:lambda/function:Function",
    "aws:rds/instance:Instance",
    "aws:s3/bucket:Bucket",
    "aws:sns/topic:Topic",
    "aws:sqs/queue:Queue",
];

pub fn is_taggable(resource_type: &str) -> bool {
    TAGGABLE_TYPES.contains(&resource_type)
}

/// EC2 and EBS resources additionally carry lifecycle (time) tags.
pub fn needs_time_tags(resource_type: &str) -> bool {
    resource_type.contains("ebs") || resource_type.contains("ec2")
}
